use anyhow::{bail, Context, Result};
use isochrone::geodesy::bearing;
use isochrone::Isochrone;
use polars::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Output formats chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Csv,
    GeoJson,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Format::Csv),
            Some("json") | Some("geojson") => Ok(Format::GeoJson),
            _ => bail!(
                "unsupported output extension for {} (use .csv, .json or .geojson)",
                path.display()
            ),
        }
    }
}

/// Write the contour to `path` in the format implied by its extension.
pub fn write_contour(path: &Path, iso: &Isochrone) -> Result<Format> {
    let format = Format::from_path(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    match format {
        Format::Csv => write_csv(path, iso)?,
        Format::GeoJson => {
            let doc = to_geojson(iso);
            fs::write(path, serde_json::to_vec_pretty(&doc)?)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }
    Ok(format)
}

/// One row per vertex in contour order.
fn write_csv(path: &Path, iso: &Isochrone) -> Result<()> {
    let order: Vec<u32> = (0..iso.points.len() as u32).collect();
    let lat: Vec<f64> = iso.points.iter().map(|p| p.lat).collect();
    let lng: Vec<f64> = iso.points.iter().map(|p| p.lng).collect();
    let bearing_deg: Vec<f64> = iso.points.iter().map(|p| bearing(iso.origin, *p)).collect();
    let mut df = df!(
        "order" => order,
        "lat" => lat,
        "lng" => lng,
        "bearing" => bearing_deg
    )?;
    let mut file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// GeoJSON FeatureCollection: the closed contour polygon plus the origin point.
pub fn to_geojson(iso: &Isochrone) -> Value {
    let mut ring: Vec<[f64; 2]> = iso.points.iter().map(|p| [p.lng, p.lat]).collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [ring] },
                "properties": {
                    "minutes": iso.target_minutes,
                    "rounds": iso.rounds,
                    "spokes": iso.spokes,
                }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [iso.origin.lng, iso.origin.lat] },
                "properties": { "role": "origin" }
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use isochrone::GeoPoint;
    use tempfile::tempdir;

    fn square() -> Isochrone {
        let origin = GeoPoint::new(41.8781, -87.6298);
        let points = [0.0, 90.0, 180.0, 270.0]
            .iter()
            .map(|&b| isochrone::geodesy::destination_point(origin, b, 3.75))
            .collect();
        Isochrone {
            origin,
            target_minutes: 15.0,
            points,
            rounds: 9,
            spokes: Vec::new(),
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a/b.CSV")).unwrap(), Format::Csv);
        assert_eq!(Format::from_path(Path::new("b.geojson")).unwrap(), Format::GeoJson);
        assert!(Format::from_path(Path::new("b.png")).is_err());
        assert!(Format::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn geojson_ring_is_closed() {
        let doc = to_geojson(&square());
        let ring = doc["features"][0]["geometry"]["coordinates"][0]
            .as_array()
            .unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(doc["features"][1]["properties"]["role"], "origin");
    }

    #[test]
    fn writes_csv_rows() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested/contour.csv");
        assert_eq!(write_contour(&out, &square()).unwrap(), Format::Csv);
        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "order,lat,lng,bearing");
        assert_eq!(lines.count(), 4);
    }

    #[test]
    fn writes_geojson_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("contour.json");
        write_contour(&out, &square()).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
    }
}
