//! Dump a compiled map as pretty-printed JSON.

use crate::model::Map;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const FILE_NAME: &str = "map.json";

pub fn emit(map: &Map, out_dir: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(out_dir.join(FILE_NAME))?);
    serde_json::to_writer_pretty(&mut out, map)?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coords, Layer, TileCode};

    #[test]
    fn test_emit_json() {
        let mut background = Layer::new(2, 1);
        background.set(1, 0, TileCode::tile(3, true));
        let map = Map {
            name: Some("hut".into()),
            tileset_path: None,
            width: 2,
            height: 1,
            background,
            objects: Layer::new(2, 1),
            entry_point: Coords::new(1, 0),
        };

        let dir = tempfile::tempdir().unwrap();
        emit(&map, dir.path()).unwrap();

        let text = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "hut");
        assert_eq!(value["width"], 2);
        assert_eq!(value["entry_point"]["x"], 1);
        assert_eq!(value["background"]["cells"][1]["index"], 3);
        assert_eq!(value["background"]["cells"][1]["solid"], true);
        assert!(value["background"]["cells"][0]["index"].is_null());
    }
}
