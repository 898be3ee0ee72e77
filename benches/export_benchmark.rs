use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weather_monitor::charts::{AsciiRenderer, ChartData, ChartRenderer, PngRenderer, SvgRenderer};
use weather_monitor::models::{Metric, StoredObservation};
use weather_monitor::storage::{MetricSeries, SeriesPoint};
use weather_monitor::writers::{ExportFormat, Exporter};

// Hourly rows for a handful of regions
fn create_test_observations(regions: usize, hours: usize) -> Vec<StoredObservation> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut records = Vec::with_capacity(regions * hours);

    for region in 0..regions {
        for hour in 0..hours {
            let timestamp = base + Duration::hours(hour as i64);
            let temp = 5.0 + (hour % 24) as f64 * 0.4 + region as f64;

            records.push(StoredObservation {
                id: (region * hours + hour) as i64 + 1,
                region_code: format!("region_{}", region),
                region_name: format!("Region's {}", region),
                latitude: 50.0 + region as f64 * 0.1,
                longitude: -1.0 - region as f64 * 0.1,
                timestamp,
                temperature: Some(temp),
                dewpoint: Some(temp - 3.0),
                humidity: Some(70.0 + (hour % 10) as f64),
                precipitation: if hour % 5 == 0 { Some(0.4) } else { None },
                pressure: Some(1013.0 - (hour % 12) as f64 * 0.5),
                wind_speed: Some(12.0),
                wind_direction: Some(225.0),
                cloud_cover: Some(60.0),
                snow_depth: None,
                wind_gust: Some(22.0),
                sunshine: Some(15.0),
                created_at: timestamp,
            });
        }
    }

    records
}

fn create_test_chart(regions: usize, hours: usize) -> ChartData {
    let series = create_test_observations(regions, hours)
        .chunks(hours)
        .map(|rows| {
            let points = rows
                .iter()
                .filter_map(|r| {
                    r.temperature.map(|value| SeriesPoint {
                        timestamp: r.timestamp,
                        value,
                    })
                })
                .collect();
            (rows[0].region_code.clone(), points)
        })
        .collect();

    ChartData::new(Metric::Temperature, hours as u32, MetricSeries { series })
}

fn benchmark_export_formats(c: &mut Criterion) {
    let records = create_test_observations(10, 168);
    let mut group = c.benchmark_group("export_formats");

    for format in ExportFormat::ALL {
        group.bench_with_input(
            BenchmarkId::new("render", format.extension()),
            &format,
            |b, &format| {
                let exporter = Exporter::new(format);
                b.iter(|| {
                    let bytes = exporter.render(black_box(&records)).unwrap_or_default();
                    black_box(bytes.map(|b| b.len()))
                })
            },
        );
    }

    group.finish();
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_export_by_size");

    for &size in &[24, 168, 720] {
        group.bench_with_input(BenchmarkId::new("hours", size), &size, |b, &hours| {
            let records = create_test_observations(5, hours);
            let exporter = Exporter::new(ExportFormat::Csv);
            b.iter(|| black_box(exporter.render(&records).map(|o| o.map(|b| b.len()))))
        });
    }

    group.finish();
}

fn benchmark_chart_rendering(c: &mut Criterion) {
    let chart = create_test_chart(5, 168);

    c.bench_function("ascii_chart", |b| {
        let renderer = AsciiRenderer::new();
        b.iter(|| black_box(renderer.render(&chart).map(|s| s.len())))
    });

    c.bench_function("svg_chart", |b| {
        let renderer = SvgRenderer::new(1000.0, 600.0);
        b.iter(|| black_box(renderer.render(&chart).map(|s| s.len())))
    });

    c.bench_function("png_chart", |b| {
        let renderer = PngRenderer::new(SvgRenderer::new(1000.0, 600.0));
        b.iter(|| black_box(renderer.render(&chart).map(|s| s.len())))
    });
}

criterion_group!(
    benches,
    benchmark_export_formats,
    benchmark_varying_data_sizes,
    benchmark_chart_rendering
);
criterion_main!(benches);
