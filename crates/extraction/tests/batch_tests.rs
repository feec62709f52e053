//! Batch runs over real directories of GeoTIFFs.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use extraction::{
    run_regrid, BatchExtractor, ExtractionError, JobConfig, RegridConfig, RegridRequest,
    StationTable,
};
use ndarray::Array2;
use station_grid::{
    codec, GeoTransform, GridConfig, KernelSpec, PixelAnchor, SamplerConfig, UniformGrid,
    WGS84_PROJ4,
};
use test_utils::fixtures::grid::{GridSpec, CHINA_01_ALIGNED, SIMPLE_10X10};
use test_utils::fixtures::stations::OUTSIDE;
use test_utils::{nan_with_block, stations_csv, BatchDirs};

fn grid_config(spec: GridSpec) -> GridConfig {
    GridConfig {
        lat_upper: spec.lat_upper,
        lon_lower: spec.lon_lower,
        lat_step: spec.lat_step,
        lon_step: spec.lon_step,
        lat_count: spec.lat_count,
        lon_count: spec.lon_count,
    }
}

/// Write a grid-layout array as a north-up GeoTIFF.
fn write_raster(path: &Path, config: &GridConfig, values: Array2<f32>) {
    let mut grid = UniformGrid::from_config(config).unwrap();
    grid.fill_owned(values).unwrap();
    codec::encode(path, grid.to_north_up().view(), &grid.geo_transform(), WGS84_PROJ4).unwrap();
}

fn read(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_kernel_job_over_isolated_block() {
    let dirs = BatchDirs::new();
    let config = grid_config(CHINA_01_ALIGNED);
    let grid = UniformGrid::from_config(&config).unwrap();

    let values = nan_with_block(grid.shape(), (199, 199), 3, 10.0);
    write_raster(&dirs.input.join("2020-01-01_GWRPM25_PM25.tif"), &config, values);

    let centre = (grid.lon()[200], grid.lat()[200]);
    let away = (grid.lon()[250], grid.lat()[200]);
    let stations = StationTable::from_reader(
        stations_csv(&[("centre", centre.0, centre.1), ("away", away.0, away.1)]).as_bytes(),
    )
    .unwrap();

    let mut job = JobConfig::new("kernel", dirs.input.clone(), dirs.output.clone());
    job.output_suffix = "-kernel".into();
    job.column_suffix = "_kernel".into();
    let sampler = SamplerConfig::KernelMean {
        kernel: KernelSpec::Ones { side: 3 },
    };
    let extractor = BatchExtractor::new(&config, &sampler, Arc::new(stations), job).unwrap();

    let summary = extractor.run().unwrap();
    assert_eq!(summary.files_seen, 1);
    assert!(summary.is_complete());

    let out = dirs.output.join("2020-01-01_GWRPM25_PM25-kernel.csv");
    assert_eq!(summary.written, vec![out.clone()]);
    assert_eq!(
        read(&out),
        [
            "id,date,PM25_kernel",
            "centre,2020-01-01,10",
            "away,2020-01-01,"
        ]
    );
}

#[test]
fn test_corrupt_and_misnamed_files_do_not_stop_batch() {
    let dirs = BatchDirs::new();
    let config = grid_config(SIMPLE_10X10);
    let grid = UniformGrid::from_config(&config).unwrap();

    write_raster(
        &dirs.input.join("2020-01-01_TEST_PM25.tif"),
        &config,
        Array2::from_elem(grid.shape(), 1.0),
    );
    fs::write(dirs.input.join("2020-01-02_TEST_PM25.tif"), b"garbage").unwrap();
    write_raster(
        &dirs.input.join("notadate_TEST_PM25.tif"),
        &config,
        Array2::from_elem(grid.shape(), 1.0),
    );
    // wrong shape for the grid
    codec::encode(
        dirs.input.join("2020-01-04_TEST_PM25.tif"),
        Array2::<f32>::zeros((3, 3)).view(),
        &GeoTransform::new(9.5, -0.5, 1.0, 1.0),
        WGS84_PROJ4,
    )
    .unwrap();
    write_raster(
        &dirs.input.join("2020-01-05_TEST_PM25.tif"),
        &config,
        Array2::from_elem(grid.shape(), 5.0),
    );

    let stations = StationTable::from_reader(stations_csv(&[("a", 4.5, 4.5)]).as_bytes()).unwrap();
    let job = JobConfig::new("mixed", dirs.input.clone(), dirs.output.clone());
    let extractor =
        BatchExtractor::new(&config, &SamplerConfig::BlockMean, Arc::new(stations), job).unwrap();

    let summary = extractor.run().unwrap();
    assert_eq!(summary.files_seen, 5);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 3);

    let failed: Vec<_> = summary
        .failures
        .iter()
        .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(
        failed,
        [
            "2020-01-02_TEST_PM25.tif",
            "2020-01-04_TEST_PM25.tif",
            "notadate_TEST_PM25.tif"
        ]
    );
    assert!(summary
        .failures
        .iter()
        .any(|f| matches!(f.error, ExtractionError::Parse { .. })));

    assert_eq!(
        read(&dirs.output.join("2020-01-05_TEST_PM25.csv"))[1],
        "a,2020-01-05,5"
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let dirs = BatchDirs::new();
    let config = grid_config(SIMPLE_10X10);
    let grid = UniformGrid::from_config(&config).unwrap();

    for day in 1..=6 {
        let values = Array2::from_shape_fn(grid.shape(), |(i, j)| (day * 100 + i * 10 + j) as f32);
        write_raster(
            &dirs.input.join(format!("2021-03-0{}_TEST_NO2.tif", day)),
            &config,
            values,
        );
    }
    let stations = Arc::new(
        StationTable::from_reader(
            stations_csv(&[("a", 1.25, 2.5), ("b", 8.9, 0.1), ("c", 20.0, 20.0)]).as_bytes(),
        )
        .unwrap(),
    );

    let sequential_out = dirs.root.path().join("seq");
    let parallel_out = dirs.root.path().join("par");
    let sampler = SamplerConfig::default();

    let seq = BatchExtractor::new(
        &config,
        &sampler,
        stations.clone(),
        JobConfig::new("seq", dirs.input.clone(), sequential_out.clone()),
    )
    .unwrap()
    .run()
    .unwrap();
    let par = BatchExtractor::new(
        &config,
        &sampler,
        stations,
        JobConfig::new("par", dirs.input.clone(), parallel_out.clone()),
    )
    .unwrap()
    .with_parallel(true)
    .run()
    .unwrap();

    assert_eq!(seq.succeeded(), 6);
    assert_eq!(par.succeeded(), 6);
    for (a, b) in seq.written.iter().zip(&par.written) {
        assert_eq!(a.file_name(), b.file_name());
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn test_regridded_raster_feeds_extraction() {
    let dirs = BatchDirs::new();
    let config = grid_config(SIMPLE_10X10);

    // coarse 2-degree source covering the grid, value = lon + lat
    let source_path = dirs.root.path().join("merra.tif");
    let source = Array2::from_shape_fn((8, 8), |(r, c)| {
        let lat = 12.0 - 2.0 * r as f32;
        let lon = -2.0 + 2.0 * c as f32;
        lon + lat
    });
    codec::encode(
        &source_path,
        source.view(),
        &GeoTransform::new(12.0, -2.0, 2.0, 2.0),
        WGS84_PROJ4,
    )
    .unwrap();

    let mut regrid_config = RegridConfig::new(dirs.input.clone());
    regrid_config.source_anchor = PixelAnchor::Corner;
    let request = RegridRequest {
        input: source_path,
        date: "2019-12-31".into(),
        dataset: "MERRA2".into(),
        variable: "BCSMASS".into(),
    };
    let written = run_regrid(&config, &regrid_config, &request).unwrap();
    assert_eq!(written, dirs.input.join("2019-12-31_MERRA2_BCSMASS.tif"));

    let stations =
        Arc::new(StationTable::from_reader(stations_csv(&[("s", 3.5, 6.25)]).as_bytes()).unwrap());
    let job = JobConfig::new("merra", dirs.input.clone(), dirs.output.clone());
    let summary = BatchExtractor::new(&config, &SamplerConfig::default(), stations, job)
        .unwrap()
        .run()
        .unwrap();
    assert!(summary.is_complete());

    let rows = read(&dirs.output.join("2019-12-31_MERRA2_BCSMASS.csv"));
    assert_eq!(rows[0], "id,date,BCSMASS");
    assert_eq!(rows[1], "s,2019-12-31,9.75");
}

#[test]
fn test_station_table_from_disk() {
    let dirs = BatchDirs::new();
    let path = test_utils::write_stations_csv(
        dirs.root.path(),
        "stations.csv",
        test_utils::fixtures::stations::CITY_SITES,
    );
    let table = StationTable::from_csv(&path).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.stations()[3].id, "2327A");
}

#[test]
fn test_nested_inputs_mirror_into_output() {
    let dirs = BatchDirs::new();
    let config = grid_config(SIMPLE_10X10);
    let grid = UniformGrid::from_config(&config).unwrap();

    let year = dirs.input_subdir("2020");
    let too_deep = dirs.input_subdir("2020/archive");
    write_raster(
        &year.join("2020-02-01_TEST_PM25.tif"),
        &config,
        Array2::from_elem(grid.shape(), 3.0),
    );
    write_raster(
        &too_deep.join("2020-02-02_TEST_PM25.tif"),
        &config,
        Array2::from_elem(grid.shape(), 4.0),
    );

    let (id, lon, lat) = OUTSIDE;
    let stations =
        StationTable::from_reader(stations_csv(&[("a", 4.5, 4.5), (id, lon, lat)]).as_bytes())
            .unwrap();
    let mut job = JobConfig::new("nested", dirs.input.clone(), dirs.output.clone());
    job.max_depth = 2;
    let extractor =
        BatchExtractor::new(&config, &SamplerConfig::BlockMean, Arc::new(stations), job).unwrap();

    let summary = extractor.run().unwrap();
    assert_eq!(summary.files_seen, 1);
    assert!(summary.is_complete());

    let out = dirs.output.join("2020").join("2020-02-01_TEST_PM25.csv");
    assert_eq!(summary.written, vec![out.clone()]);
    assert_eq!(
        read(&out),
        ["id,date,PM25", "a,2020-02-01,3", "9999X,2020-02-01,"]
    );
}
