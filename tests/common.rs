#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes a small but non-trivial image; the format follows the extension.
pub fn write_test_image(path: &Path, size: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let image = RgbImage::from_fn(size, size, |x, y| {
        Rgb([(x * 11 % 256) as u8, (y * 7 % 256) as u8, ((x ^ y) % 256) as u8])
    });
    image.save(path).unwrap();
}

pub fn write_text_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(contents).unwrap();
}

/// root/a.jpg, root/b.png, root/c.txt
pub fn create_flat_tree(root: &Path) -> Vec<PathBuf> {
    let jpg = root.join("a.jpg");
    let png = root.join("b.png");
    write_test_image(&jpg, 48);
    write_test_image(&png, 48);
    write_text_file(&root.join("c.txt"), b"not an image");
    vec![jpg, png]
}

/// root/x/img.png and root/y/img.png, colliding in flattened mode.
pub fn create_colliding_tree(root: &Path) -> (PathBuf, PathBuf) {
    let first = root.join("x").join("img.png");
    let second = root.join("y").join("img.png");
    write_test_image(&first, 16);
    write_test_image(&second, 40);
    (first, second)
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
