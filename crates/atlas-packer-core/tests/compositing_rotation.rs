use atlas_packer_core::compositing::{blit_rgba, extract_rgba};
use atlas_packer_core::prelude::*;
use image::{Rgba, RgbaImage};

fn numbered(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, (x * 10 + y) as u8, 255]))
}

#[test]
fn rotated_blit_turns_clockwise() {
    let src = numbered(2, 3);
    let mut canvas = RgbaImage::new(6, 6);
    blit_rgba(&src, &mut canvas, 1, 1, true);

    // bottom-left source pixel lands top-left
    assert_eq!(canvas.get_pixel(1, 1), src.get_pixel(0, 2));
    assert_eq!(canvas.get_pixel(3, 1), src.get_pixel(0, 0));
    assert_eq!(canvas.get_pixel(1, 2), src.get_pixel(1, 2));
    assert_eq!(canvas.get_pixel(3, 2), src.get_pixel(1, 0));
    // footprint is 3x2
    assert_eq!(canvas.get_pixel(4, 1)[3], 0);
    assert_eq!(canvas.get_pixel(1, 3)[3], 0);
    assert_eq!(canvas.get_pixel(0, 0)[3], 0);
}

#[test]
fn upright_blit_copies_and_clips() {
    let src = numbered(4, 4);
    let mut canvas = RgbaImage::new(5, 5);
    blit_rgba(&src, &mut canvas, 3, 3, false);
    assert_eq!(canvas.get_pixel(3, 3), src.get_pixel(0, 0));
    assert_eq!(canvas.get_pixel(4, 4), src.get_pixel(1, 1));
    assert_eq!(canvas.get_pixel(2, 2)[3], 0);
}

#[test]
fn extract_undoes_blit() {
    let src = numbered(5, 3);
    for rotated in [false, true] {
        let mut canvas = RgbaImage::new(8, 8);
        blit_rgba(&src, &mut canvas, 2, 1, rotated);
        let back = extract_rgba(&canvas, 2, 1, 5, 3, rotated);
        assert_eq!(back, src, "rotated = {rotated}");
    }
}

#[test]
fn composited_pages_hold_source_pixels() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(64, 64)
        .padding(1)
        .allow_rotation(true)
        .build();
    let sources = vec![
        ("wide", numbered(60, 20)),
        ("tall", numbered(10, 40)),
        ("square", numbered(12, 12)),
    ];
    let inputs = sources
        .iter()
        .map(|(n, img)| InputImage::new(*n, img.clone()))
        .collect();
    let out = pack_images(inputs, cfg).expect("pack");
    let mut seen = 0;
    for page in &out.pages {
        for img in &page.atlas.images {
            let (_, src) = sources.iter().find(|(n, _)| *n == img.name).expect("source");
            let back = extract_rgba(&page.rgba, img.x, img.y, img.width, img.height, img.rotated);
            assert_eq!(&back, src, "{}", img.name);
            seen += 1;
        }
    }
    assert_eq!(seen, 3);
}
