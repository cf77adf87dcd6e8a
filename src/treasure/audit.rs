use crate::treasure::pipeline::BadTileHit;
use crate::world::position::Point2D;
use crate::world::query::WorldQuery;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `x y z 0xID` per rejected point.
pub fn write_bad_tile_audit(path: &Path, hits: &[BadTileHit]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for hit in hits {
        writeln!(
            out,
            "{} {} {} 0x{:04X}",
            hit.point.x, hit.point.y, hit.point.z, hit.tile_id
        )?;
    }
    out.flush()
}

/// `x y region` per stored candidate; points outside any region say `-`.
pub fn write_region_audit<W: WorldQuery>(
    path: &Path,
    world: &W,
    locations: &[Point2D],
) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for point in locations {
        let region = world.region_at(*point);
        let name = region.as_ref().map(|region| region.name.as_str()).unwrap_or("-");
        writeln!(out, "{} {} {}", point.x, point.y, name)?;
    }
    out.flush()
}
