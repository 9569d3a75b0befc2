//! Raw little-endian dump in the legacy packed tile format.
//
//      u32 width, u32 height, u32 entry_x, u32 entry_y
//      width * height u32 background codes (column-major)
//      width * height u32 object codes (column-major)

use crate::model::{Layer, Map};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const FILE_NAME: &str = "map.bin";

pub fn emit(map: &Map, out_dir: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(out_dir.join(FILE_NAME))?);
    write_map(map, &mut out)?;
    out.flush()
}

pub fn write_map<W: Write>(map: &Map, out: &mut W) -> io::Result<()> {
    for n in [
        map.width,
        map.height,
        map.entry_point.x as usize,
        map.entry_point.y as usize,
    ] {
        out.write_all(&header_word(n)?.to_le_bytes())?;
    }
    layer(&map.background, "background", out)?;
    layer(&map.objects, "object", out)
}

fn header_word(n: usize) -> io::Result<u32> {
    u32::try_from(n).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{n} does not fit in 32 bits"),
        )
    })
}

fn layer<W: Write>(layer: &Layer, what: &str, out: &mut W) -> io::Result<()> {
    for (i, code) in layer.cells().iter().enumerate() {
        let packed = code.to_packed().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{what} cell {i}: tile index {:?} does not fit the packed format",
                    code.index
                ),
            )
        })?;
        out.write_all(&packed.to_le_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coords, TileCode};

    fn map(width: usize, height: usize) -> Map {
        Map {
            name: None,
            tileset_path: None,
            width,
            height,
            background: Layer::new(width, height),
            objects: Layer::new(width, height),
            entry_point: Coords::new(1, 0),
        }
    }

    fn words(bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_layout() {
        let mut m = map(2, 1);
        m.background.set(0, 0, TileCode::tile(0, true));
        m.background.set(1, 0, TileCode::tile(4, false));
        m.objects.set(1, 0, TileCode::tile(9, false));

        let mut out = Vec::new();
        write_map(&m, &mut out).unwrap();

        assert_eq!(
            words(&out),
            vec![2, 1, 1, 0, (1 << 24) | 1, 5 << 24, 0, 10 << 24]
        );
    }

    #[test]
    fn test_unpackable_index() {
        let mut m = map(1, 1);
        m.objects.set(0, 0, TileCode::tile(255, false));

        let err = write_map(&m, &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().starts_with("object cell 0"));
    }
}
