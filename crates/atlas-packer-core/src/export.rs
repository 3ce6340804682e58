//! Atlas description writers: little-endian binary, JSON and XML.
//!
//! Binary layout (all integers little-endian):
//!
//! ```text
//! i16 atlas_count
//! per atlas:
//!   u8 rotated, u8 trimmed, u8 premultiplied
//!   string name, i16 width, i16 height, i16 image_count
//!   per image:
//!     string name, i16 x, i16 y, i16 width, i16 height
//!     [i16 frame_x, i16 frame_y, i16 frame_w, i16 frame_h]   only when trimmed
//! ```
//!
//! A string is its UTF-8 byte length as a 7-bit varint, then the bytes.

use crate::error::{AtlasPackerError, Result};
use crate::model::{Atlas, AtlasImage};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde_json::Value;
use std::io::{Read, Write};

fn to_i16(v: i64, field: &str) -> Result<i16> {
    i16::try_from(v)
        .map_err(|_| AtlasPackerError::Encode(format!("{field} = {v} does not fit in an i16")))
}

fn to_u32(v: i16, field: &str) -> Result<u32> {
    u32::try_from(v)
        .map_err(|_| AtlasPackerError::InvalidInput(format!("negative {field} ({v}) in binary atlas")))
}

fn write_string<W: Write>(w: &mut W, s: &str) -> Result<()> {
    let mut len = s.len();
    while len >= 0x80 {
        w.write_u8((len as u8 & 0x7f) | 0x80)?;
        len >>= 7;
    }
    w.write_u8(len as u8)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(r: &mut R) -> Result<String> {
    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let b = r.read_u8()?;
        len |= ((b & 0x7f) as usize) << shift;
        if b & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 28 {
            return Err(AtlasPackerError::InvalidInput(
                "string length prefix is too long".into(),
            ));
        }
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| AtlasPackerError::InvalidInput(format!("atlas string is not UTF-8: {e}")))
}

/// Writes `atlases` in the binary layout described in the module docs.
pub fn write_binary<W: Write>(w: &mut W, atlases: &[Atlas]) -> Result<()> {
    w.write_i16::<LittleEndian>(to_i16(atlases.len() as i64, "atlas count")?)?;
    for atlas in atlases {
        w.write_u8(atlas.is_rotated as u8)?;
        w.write_u8(atlas.is_trimmed as u8)?;
        w.write_u8(atlas.is_premultiplied as u8)?;
        write_string(w, &atlas.name)?;
        w.write_i16::<LittleEndian>(to_i16(atlas.width as i64, "atlas width")?)?;
        w.write_i16::<LittleEndian>(to_i16(atlas.height as i64, "atlas height")?)?;
        w.write_i16::<LittleEndian>(to_i16(atlas.images.len() as i64, "image count")?)?;
        for img in &atlas.images {
            write_string(w, &img.name)?;
            w.write_i16::<LittleEndian>(to_i16(img.x as i64, "x")?)?;
            w.write_i16::<LittleEndian>(to_i16(img.y as i64, "y")?)?;
            w.write_i16::<LittleEndian>(to_i16(img.width as i64, "width")?)?;
            w.write_i16::<LittleEndian>(to_i16(img.height as i64, "height")?)?;
            if atlas.is_trimmed {
                w.write_i16::<LittleEndian>(to_i16(img.frame_x as i64, "frame_x")?)?;
                w.write_i16::<LittleEndian>(to_i16(img.frame_y as i64, "frame_y")?)?;
                w.write_i16::<LittleEndian>(to_i16(img.frame_w as i64, "frame_w")?)?;
                w.write_i16::<LittleEndian>(to_i16(img.frame_h as i64, "frame_h")?)?;
            }
        }
    }
    Ok(())
}

/// Binary description as a byte vector.
pub fn to_binary(atlases: &[Atlas]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_binary(&mut out, atlases)?;
    Ok(out)
}

/// Reads atlases written by [`write_binary`]. Untrimmed images get a
/// `(0, 0, width, height)` frame; `rotated` and `duplicate_of` are not stored.
pub fn read_binary<R: Read>(r: &mut R) -> Result<Vec<Atlas>> {
    let count = r.read_i16::<LittleEndian>()?;
    let count = to_u32(count, "atlas count")? as usize;
    let mut atlases = Vec::with_capacity(count);
    for _ in 0..count {
        let is_rotated = r.read_u8()? != 0;
        let is_trimmed = r.read_u8()? != 0;
        let is_premultiplied = r.read_u8()? != 0;
        let name = read_string(r)?;
        let width = to_u32(r.read_i16::<LittleEndian>()?, "atlas width")?;
        let height = to_u32(r.read_i16::<LittleEndian>()?, "atlas height")?;
        let n = to_u32(r.read_i16::<LittleEndian>()?, "image count")? as usize;
        let mut images = Vec::with_capacity(n);
        for _ in 0..n {
            let name = read_string(r)?;
            let x = to_u32(r.read_i16::<LittleEndian>()?, "x")?;
            let y = to_u32(r.read_i16::<LittleEndian>()?, "y")?;
            let width = to_u32(r.read_i16::<LittleEndian>()?, "width")?;
            let height = to_u32(r.read_i16::<LittleEndian>()?, "height")?;
            let (frame_x, frame_y, frame_w, frame_h) = if is_trimmed {
                (
                    r.read_i16::<LittleEndian>()? as i32,
                    r.read_i16::<LittleEndian>()? as i32,
                    to_u32(r.read_i16::<LittleEndian>()?, "frame_w")?,
                    to_u32(r.read_i16::<LittleEndian>()?, "frame_h")?,
                )
            } else {
                (0, 0, width, height)
            };
            images.push(AtlasImage {
                name,
                x,
                y,
                width,
                height,
                frame_x,
                frame_y,
                frame_w,
                frame_h,
                ..Default::default()
            });
        }
        atlases.push(Atlas {
            name,
            width,
            height,
            images,
            is_rotated,
            is_trimmed,
            is_premultiplied,
        });
    }
    Ok(atlases)
}

/// JSON array of atlases with PascalCase keys.
pub fn to_json_value(atlases: &[Atlas]) -> Result<Value> {
    serde_json::to_value(atlases).map_err(|e| AtlasPackerError::Encode(e.to_string()))
}

/// Pretty-printed [`to_json_value`].
pub fn to_json(atlases: &[Atlas]) -> Result<String> {
    serde_json::to_string_pretty(atlases).map_err(|e| AtlasPackerError::Encode(e.to_string()))
}

/// `<ArrayOfAtlas>` document with one `<Atlas>` element per atlas.
pub fn to_xml(atlases: &[Atlas]) -> String {
    let mut s = String::new();
    s.push_str(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ArrayOfAtlas xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
"#,
    );
    for atlas in atlases {
        s.push_str("  <Atlas>\n");
        s.push_str(&format!(
            "    <Name>{}</Name>\n    <Width>{}</Width>\n    <Height>{}</Height>\n    <Images>\n",
            xml_escape(&atlas.name),
            atlas.width,
            atlas.height
        ));
        for img in &atlas.images {
            s.push_str(&format!(
                "      <Image>\n        <Name>{}</Name>\n        <X>{}</X>\n        <Y>{}</Y>\n        <Width>{}</Width>\n        <Height>{}</Height>\n        <FrameX>{}</FrameX>\n        <FrameY>{}</FrameY>\n        <FrameW>{}</FrameW>\n        <FrameH>{}</FrameH>\n      </Image>\n",
                xml_escape(&img.name),
                img.x,
                img.y,
                img.width,
                img.height,
                img.frame_x,
                img.frame_y,
                img.frame_w,
                img.frame_h,
            ));
        }
        s.push_str(&format!(
            "    </Images>\n    <IsRotated>{}</IsRotated>\n    <IsTrimmed>{}</IsTrimmed>\n    <IsPremultiplied>{}</IsPremultiplied>\n  </Atlas>\n",
            atlas.is_rotated, atlas.is_trimmed, atlas.is_premultiplied
        ));
    }
    s.push_str("</ArrayOfAtlas>\n");
    s
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
