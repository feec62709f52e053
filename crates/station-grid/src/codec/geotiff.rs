//! Single-band GeoTIFF reader and writer.
//!
//! Georeferencing uses ModelPixelScale (33550) and ModelTiepoint (33922)
//! for the affine transform and a minimal GeoKey directory (34735) with the
//! projection string as the geographic citation (34737).

use std::fs::File;
use std::path::Path;

use ndarray::{Array2, ArrayView2};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{GridError, Result};
use crate::types::GeoTransform;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const GEOG_CITATION_KEY: u16 = 2049;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const GCS_WGS_84: u16 = 4326;
const USER_DEFINED: u16 = 32767;

/// A raster read back from disk.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    /// Pixel values, `(rows, cols)`, row 0 northernmost.
    pub data: Array2<f32>,
    /// Affine transform, when the file carries one.
    pub transform: Option<GeoTransform>,
    /// Projection string, when the file carries one.
    pub projection: Option<String>,
}

/// Write `array` as a north-up single-band Float32 GeoTIFF.
///
/// `array` is `(rows, cols)` with row 0 northernmost. The file's affine
/// transform is `(origin_lon, +pixel_lon_width, 0, origin_lat, 0,
/// -pixel_lat_width)`.
pub fn encode<P: AsRef<Path>>(
    path: P,
    array: ArrayView2<'_, f32>,
    transform: &GeoTransform,
    projection: &str,
) -> Result<()> {
    let (rows, cols) = array.dim();
    if rows == 0 || cols == 0 {
        return Err(GridError::shape_mismatch((1, 1), (rows, cols)));
    }
    if !(transform.pixel_lat_width > 0.0 && transform.pixel_lon_width > 0.0) {
        return Err(GridError::invalid_geometry(
            "pixel widths must be positive",
        ));
    }
    let width = u32::try_from(cols).map_err(|_| GridError::codec("raster too wide"))?;
    let height = u32::try_from(rows).map_err(|_| GridError::codec("raster too tall"))?;

    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file)?;
    let mut image = encoder.new_image::<colortype::Gray32Float>(width, height)?;

    let pixel_scale = [transform.pixel_lon_width, transform.pixel_lat_width, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, transform.origin_lon, transform.origin_lat, 0.0];
    let citation = format!("{}|", projection);
    let geographic_type = if is_wgs84(projection) {
        GCS_WGS_84
    } else {
        USER_DEFINED
    };
    let geo_keys: [u16; 20] = [
        1, 1, 0, 4,
        GT_MODEL_TYPE_KEY, 0, 1, MODEL_TYPE_GEOGRAPHIC,
        GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_AREA,
        GEOGRAPHIC_TYPE_KEY, 0, 1, geographic_type,
        GEOG_CITATION_KEY, 34737, citation.len() as u16, 0,
    ];

    let dir = image.encoder();
    dir.write_tag(Tag::ModelPixelScaleTag, &pixel_scale[..])?;
    dir.write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
    dir.write_tag(Tag::GeoKeyDirectoryTag, &geo_keys[..])?;
    dir.write_tag(Tag::GeoAsciiParamsTag, citation.as_str())?;

    let data: Vec<f32> = array.iter().copied().collect();
    image.write_data(&data)?;

    debug!(
        path = %path.as_ref().display(),
        rows = rows,
        cols = cols,
        "Wrote GeoTIFF"
    );
    Ok(())
}

/// Read the first band of a GeoTIFF as `f32`.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<DecodedRaster> {
    let file = File::open(path.as_ref())?;
    let mut decoder = Decoder::new(file)?;
    let (width, height) = decoder.dimensions()?;

    let pixel_scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();
    let transform = match (pixel_scale, tiepoint) {
        // ModelTiepoint: [I, J, K, X, Y, Z], ModelPixelScale: [ScaleX, ScaleY, ScaleZ]
        (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 6 => Some(GeoTransform::new(
            tie[4] + tie[1] * scale[1],
            tie[3] - tie[0] * scale[0],
            scale[1],
            scale[0],
        )),
        _ => None,
    };
    let projection = decoder
        .get_tag_ascii_string(Tag::GeoAsciiParamsTag)
        .ok()
        .map(|s| s.trim_end_matches(['|', '\0']).to_string())
        .filter(|s| !s.is_empty());

    let values: Vec<f32> = match decoder.read_image()? {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        _ => return Err(GridError::codec("unsupported sample format")),
    };

    let (rows, cols) = (height as usize, width as usize);
    if values.len() != rows * cols {
        // multi-band or chunky layouts decode to more samples than pixels
        return Err(GridError::codec(format!(
            "expected {} samples for a single band, got {}",
            rows * cols,
            values.len()
        )));
    }
    let data = Array2::from_shape_vec((rows, cols), values)?;

    debug!(path = %path.as_ref().display(), rows = rows, cols = cols, "Read GeoTIFF");
    Ok(DecodedRaster {
        data,
        transform,
        projection,
    })
}

fn is_wgs84(projection: &str) -> bool {
    let lower = projection.to_lowercase();
    lower.contains("wgs84") || lower.contains("wgs 84") || lower.contains("epsg:4326")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WGS84_PROJ4;

    #[test]
    fn test_encode_rejects_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let empty = Array2::<f32>::zeros((0, 3));
        let gt = GeoTransform::new(56.0, 72.0, 0.1, 0.1);
        let err = encode(dir.path().join("empty.tif"), empty.view(), &gt, WGS84_PROJ4).unwrap_err();
        assert!(matches!(err, GridError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_encode_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let array = Array2::<f32>::zeros((2, 2));
        let gt = GeoTransform::new(56.0, 72.0, 0.1, 0.1);
        let path = dir.path().join("no/such/dir/out.tif");
        let err = encode(path, array.view(), &gt, WGS84_PROJ4).unwrap_err();
        assert!(matches!(err, GridError::Io(_)));
    }

    #[test]
    fn test_decode_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(decode(dir.path().join("absent.tif")), Err(GridError::Io(_))));
    }

    #[test]
    fn test_decode_garbage_is_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.tif");
        std::fs::write(&path, b"not a tiff at all").unwrap();
        assert!(decode(&path).is_err());
    }

    #[test]
    fn test_wgs84_detection() {
        assert!(is_wgs84(WGS84_PROJ4));
        assert!(is_wgs84("EPSG:4326"));
        assert!(!is_wgs84("+proj=longlat +ellps=krass"));
    }
}
