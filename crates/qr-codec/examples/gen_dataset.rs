//! Generator of synthetic QR code dataset
//!
//! Usage: cargo run -p qr-codec --example gen_dataset

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use qr_codec::{encode, ErrorCorrectionLevel, Renderer, Version};
use rand::Rng;
use std::fs;
use std::path::Path;

fn main() {
    let output_dir = Path::new("generated_dataset");
    if output_dir.exists() {
        fs::remove_dir_all(output_dir).unwrap();
    }
    fs::create_dir_all(output_dir).unwrap();

    println!("Generating dataset in {:?}", output_dir);

    let payloads = [
        ("numeric", "01234567890123456789", 1, ErrorCorrectionLevel::M),
        ("alnum", "HELLO WORLD QR WORKBENCH", 2, ErrorCorrectionLevel::Q),
        ("url", "https://github.com/your-org/qr-workbench", 4, ErrorCorrectionLevel::M),
        ("json", "{\"id\":123,\"name\":\"Test Item\",\"active\":true}", 7, ErrorCorrectionLevel::H),
    ];

    let renderer = Renderer::default();
    let mut count = 0;

    for (cat, content, version, ec) in &payloads {
        let version = Version::new(*version).unwrap();
        let symbol = encode(content.as_bytes(), version, *ec).unwrap();

        // 1. Clean images
        let img = renderer.render(&symbol);
        save(&img, output_dir, &format!("{}_clean.png", cat));
        count += 1;

        // 2. Blurred
        let blurred = gaussian_blur_f32(&img, 2.0);
        save(&blurred, output_dir, &format!("{}_blur_2.0.png", cat));
        count += 1;

        // 3. Rotated
        for angle in [15.0f32, 30.0, 45.0, 90.0] {
            let rotated = rotate_about_center(&img, angle.to_radians(), Interpolation::Bilinear, Luma([255]));
            save(&rotated, output_dir, &format!("{}_rot_{}.png", cat, angle));
            count += 1;
        }

        // 4. Noisy (Salt & Pepper)
        let mut rng = rand::thread_rng();
        let mut noisy = img.clone();
        for p in noisy.pixels_mut() {
            if rng.gen::<f64>() < 0.05 {
                p.0[0] = if rng.gen() { 0 } else { 255 };
            }
        }
        save(&noisy, output_dir, &format!("{}_noise.png", cat));
        count += 1;

        // 5. Low Contrast
        let mut low_contrast = img.clone();
        for p in low_contrast.pixels_mut() {
            p.0[0] = (100.0 + f32::from(p.0[0]) / 255.0 * 50.0) as u8;
        }
        save(&low_contrast, output_dir, &format!("{}_low_contrast.png", cat));
        count += 1;
    }

    println!("Generated {} images.", count);
}

fn save(img: &GrayImage, dir: &Path, name: &str) {
    img.save(dir.join(name)).unwrap();
}
