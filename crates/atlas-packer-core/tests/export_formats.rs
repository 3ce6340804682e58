use atlas_packer_core::prelude::*;
use atlas_packer_core::{AtlasPackerError, to_json_value};

fn sample() -> Atlas {
    Atlas {
        name: "a0.png".into(),
        width: 64,
        height: 32,
        images: vec![AtlasImage {
            name: "x".into(),
            x: 1,
            y: 2,
            width: 3,
            height: 4,
            frame_x: -1,
            frame_y: -2,
            frame_w: 5,
            frame_h: 6,
            ..Default::default()
        }],
        is_rotated: false,
        is_trimmed: true,
        is_premultiplied: true,
    }
}

#[test]
fn binary_layout_is_little_endian() {
    let bytes = to_binary(&[sample()]).expect("encode");
    let mut expected = vec![1, 0, 0, 1, 1, 6];
    expected.extend_from_slice(b"a0.png");
    expected.extend_from_slice(&[64, 0, 32, 0, 1, 0, 1, b'x']);
    expected.extend_from_slice(&[1, 0, 2, 0, 3, 0, 4, 0]);
    expected.extend_from_slice(&[0xff, 0xff, 0xfe, 0xff, 5, 0, 6, 0]);
    assert_eq!(bytes, expected);

    let back = read_binary(&mut bytes.as_slice()).expect("decode");
    assert_eq!(back, vec![sample()]);
}

#[test]
fn untrimmed_atlas_omits_frames() {
    let mut atlas = sample();
    atlas.is_trimmed = false;
    let bytes = to_binary(&[atlas.clone()]).expect("encode");
    let trimmed = to_binary(&[sample()]).expect("encode");
    assert_eq!(bytes.len() + 8, trimmed.len());

    let back = read_binary(&mut bytes.as_slice()).expect("decode");
    let img = &back[0].images[0];
    assert_eq!((img.frame_x, img.frame_y, img.frame_w, img.frame_h), (0, 0, 3, 4));
}

#[test]
fn long_names_use_varint_prefix() {
    let mut atlas = sample();
    atlas.name = "n".repeat(200);
    let bytes = to_binary(&[atlas.clone()]).expect("encode");
    assert_eq!(&bytes[5..7], &[0xC8, 0x01]);
    let back = read_binary(&mut bytes.as_slice()).expect("decode");
    assert_eq!(back[0].name, atlas.name);
}

#[test]
fn out_of_range_values_fail_to_encode() {
    let mut atlas = sample();
    atlas.width = 40_000;
    let err = to_binary(&[atlas]).unwrap_err();
    assert!(matches!(err, AtlasPackerError::Encode(_)));
}

#[test]
fn truncated_binary_is_an_error() {
    let bytes = to_binary(&[sample()]).expect("encode");
    let cut = &bytes[..bytes.len() - 3];
    assert!(read_binary(&mut &cut[..]).is_err());
}

#[test]
fn packed_layout_survives_binary() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .trim(true)
        .build();
    let items = vec![
        LayoutItem::new("a", 32, 16).with_frame(2, 2, 40, 20),
        LayoutItem::new("b", 10, 10),
    ];
    let atlases = pack_layout_items(items, cfg).expect("pack");
    let bytes = to_binary(&atlases).expect("encode");
    let back = read_binary(&mut bytes.as_slice()).expect("decode");
    assert_eq!(back.len(), atlases.len());
    for (a, b) in atlases.iter().zip(&back) {
        assert_eq!(a.name, b.name);
        assert_eq!((a.width, a.height), (b.width, b.height));
        for (ia, ib) in a.images.iter().zip(&b.images) {
            assert_eq!((ia.x, ia.y, ia.frame_x, ia.frame_w), (ib.x, ib.y, ib.frame_x, ib.frame_w));
        }
    }
}

#[test]
fn json_uses_pascal_case() {
    let v = to_json_value(&[sample()]).expect("json");
    let atlas = &v[0];
    assert_eq!(atlas["Name"], "a0.png");
    assert_eq!(atlas["IsTrimmed"], true);
    assert_eq!(atlas["Images"][0]["FrameX"], -1);
    assert_eq!(atlas["Images"][0]["FrameH"], 6);
    assert!(atlas["Images"][0].get("Rotated").is_none());
    assert!(to_json(&[sample()]).expect("json").contains("\"IsPremultiplied\": true"));
}

#[test]
fn xml_escapes_names() {
    let mut atlas = sample();
    atlas.images[0].name = "a&b<c>\"'".into();
    let xml = to_xml(&[atlas]);
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(xml.contains("<ArrayOfAtlas"));
    assert!(xml.contains("<Name>a&amp;b&lt;c&gt;&quot;&apos;</Name>"));
    assert!(xml.contains("<FrameX>-1</FrameX>"));
    assert!(xml.contains("<IsTrimmed>true</IsTrimmed>"));
    assert!(xml.contains("<IsRotated>false</IsRotated>"));
    assert!(xml.trim_end().ends_with("</ArrayOfAtlas>"));
}
