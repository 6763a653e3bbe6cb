use image::DynamicImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read the EXIF orientation tag, defaulting to 1 (upright).
///
/// PNG files carry EXIF in an `eXIf` chunk which may sit anywhere before
/// `IEND`, so the whole container is scanned.
pub fn get_orientation(path: &Path) -> u32 {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return 1,
    };

    let exif = match exif::Reader::new().read_from_container(&mut BufReader::new(file)) {
        Ok(e) => e,
        Err(e) => {
            tracing::trace!("No EXIF in {}: {}", path.display(), e);
            return 1;
        }
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => v.first().map(|&x| x as u32).unwrap_or(1),
            exif::Value::Long(ref v) => v.first().copied().unwrap_or(1),
            _ => 1,
        },
        None => 1,
    }
}

/// Rotate/flip `img` so it displays upright for the given EXIF orientation.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}
