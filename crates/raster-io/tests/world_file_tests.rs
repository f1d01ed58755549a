//! Tests for reading georeferenced images from disk.

use gis_common::RasterGeometry;
use image::DynamicImage;
use raster_io::{
    read_dataset, BandData, ColorRole, RasterData, RasterProvider, SampleType, TranslateOptions,
    WorldFileProvider,
};
use test_utils::{crs, geo, heightmap_image_u16, position_color_tile, write_world_file_raster};

#[test]
fn test_open_rgba_with_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    let img = DynamicImage::ImageRgba8(position_color_tile(8, 4, 77));
    let written =
        write_world_file_raster(dir.path(), "color", &img, &geo::UTM_30M, Some(crs::EPSG_3857))
            .unwrap();

    let ds = WorldFileProvider::new().open(&written.image).unwrap();
    assert_eq!((ds.width(), ds.height()), (8, 4));
    assert_eq!(ds.band_count(), 4);
    assert_eq!(ds.crs_wkt(), crs::EPSG_3857);
    assert_eq!(ds.band(1).unwrap().color_role, ColorRole::Red);
    assert_eq!(ds.band(4).unwrap().color_role, ColorRole::Alpha);

    let gt = ds.geo_transform().unwrap();
    for (got, want) in gt.0.iter().zip(geo::UTM_30M.0.iter()) {
        assert!((got - want).abs() < 1e-6, "{:?} vs {:?}", gt, geo::UTM_30M);
    }

    let mut out = RasterData::filled(8, 4, 4, 255u8);
    read_dataset(ds.as_ref(), &mut out, &[1, 2, 3]).unwrap();
    // pixel (3, 2): x=3, y=2, tag=77
    let idx = (2 * 8 + 3) * 4;
    assert_eq!(&out.data[idx..idx + 4], &[3, 2, 77, 255]);
}

#[test]
fn test_missing_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.png");
    DynamicImage::ImageRgba8(position_color_tile(2, 2, 0))
        .save(&path)
        .unwrap();

    let ds = WorldFileProvider::new().open(&path).unwrap();
    assert!(ds.geo_transform().is_none());
    assert!(ds.crs_wkt().is_empty());
}

#[test]
fn test_sixteen_bit_heightmap_translates_to_float32() {
    let dir = tempfile::tempdir().unwrap();
    let samples: Vec<u16> = (0..12).map(|v| v * 1000).collect();
    let img = heightmap_image_u16(4, 3, &samples);
    let written =
        write_world_file_raster(dir.path(), "height", &img, &geo::MERCATOR_10M, None).unwrap();

    let provider = WorldFileProvider::new();
    let ds = provider.open(&written.image).unwrap();
    assert_eq!(ds.band_count(), 1);
    assert_eq!(ds.band(1).unwrap().sample_type, SampleType::UInt16);

    let translated = provider
        .translate(ds.as_ref(), &TranslateOptions::output_type(SampleType::Float32))
        .unwrap();
    assert_eq!(translated.band(1).unwrap().sample_type, SampleType::Float32);
    match translated.read_band(1).unwrap() {
        BandData::Float32(values) => {
            assert_eq!(values.len(), 12);
            assert_eq!(values[11], 11000.0);
        }
        other => panic!("unexpected {:?}", other.sample_type()),
    }
    assert_eq!(translated.geo_transform(), ds.geo_transform());
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(WorldFileProvider::new()
        .open(&dir.path().join("nope.png"))
        .is_err());
}
