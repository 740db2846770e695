//! Integration test: checkpoints written to disk restart runs exactly.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sf_archive::Format;
use sf_models::{Advection1d, AdvectionProduct, AdvectionState};
use sf_results::store::{load_checkpoint, load_product, load_timeseries};
use sf_results::{Checkpoint, FileSink, OutputDir, ResultsError, config_fingerprint, resume};
use sf_sim::{DriverConfig, Physics, RunConfig, ScheduleSpec, SimError, run_fresh};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn config() -> RunConfig<Advection1d> {
    RunConfig {
        driver: DriverConfig {
            rk_order: 3,
            t_final: 0.5,
            checkpoint: ScheduleSpec::nearest(0.1),
            product: ScheduleSpec::exact(0.25),
            timeseries: ScheduleSpec::exact(0.05),
            ..Default::default()
        },
        physics: Advection1d {
            num_zones: 64,
            ..Default::default()
        },
    }
}

#[test]
fn restart_from_disk_matches_uninterrupted_run() {
    let cfg = config();
    for format in Format::ALL {
        let root = unique_temp_dir(&format!("sf_results_full_{format}"));
        let dir = OutputDir::new(root.clone(), format).unwrap();
        let mut sink = FileSink::for_config(dir.clone(), &cfg).unwrap().quiet();
        let (full_state, full_driver) = run_fresh(&cfg, &mut sink).unwrap();

        let checkpoints = dir.list_checkpoints().unwrap();
        assert_eq!(checkpoints.len(), 6, "format {format}");
        assert_eq!(checkpoints[0].0, 0);

        let (_, path) = &checkpoints[2];
        let resumed_dir =
            OutputDir::new(unique_temp_dir(&format!("sf_results_resumed_{format}")), format)
                .unwrap();
        let mut resumed_sink = FileSink::for_config(resumed_dir.clone(), &cfg)
            .unwrap()
            .quiet();
        let (state, driver) = resume(&cfg, path, &mut resumed_sink).unwrap();

        assert_eq!(state, full_state, "format {format}");
        assert_eq!(driver, full_driver, "format {format}");

        // Numbering continues from the restored counter.
        assert!(!resumed_dir.checkpoint_path(2).exists());
        assert!(resumed_dir.checkpoint_path(3).exists());

        let restored_series = load_timeseries(&resumed_dir.timeseries_path()).unwrap();
        assert_eq!(restored_series, full_driver.timeseries, "format {format}");

        fs::remove_dir_all(&root).ok();
        fs::remove_dir_all(resumed_dir.root()).ok();
    }
}

#[test]
fn checkpoint_zero_holds_the_initial_state() {
    let cfg = config();
    let root = unique_temp_dir("sf_results_initial");
    let dir = OutputDir::new(root.clone(), Format::Text).unwrap();
    let mut sink = FileSink::for_config(dir.clone(), &cfg).unwrap().quiet();
    run_fresh(&cfg, &mut sink).unwrap();

    let checkpoint: Checkpoint<AdvectionState> = load_checkpoint(&dir.checkpoint_path(0)).unwrap();
    assert_eq!(checkpoint.state, cfg.physics.initial_state());
    assert_eq!(checkpoint.driver.iteration, 0);
    assert_eq!(checkpoint.config_hash, config_fingerprint(&cfg).unwrap());

    let product: AdvectionProduct = load_product(&dir.product_path(0)).unwrap();
    assert_eq!(product.primitive, cfg.physics.initial_state().conserved);
    assert!(dir.product_path(2).exists());
    assert!(!dir.product_path(3).exists());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn changed_configuration_still_resumes() {
    let cfg = config();
    let root = unique_temp_dir("sf_results_changed");
    let dir = OutputDir::new(root.clone(), Format::Binary).unwrap();
    let mut sink = FileSink::for_config(dir.clone(), &cfg).unwrap().quiet();
    run_fresh(&cfg, &mut sink).unwrap();

    let mut longer = cfg.clone();
    longer.driver.t_final = 0.6;
    let latest = dir.latest_checkpoint().unwrap().unwrap();
    let mut resumed_sink = FileSink::for_config(dir.clone(), &longer).unwrap().quiet();
    let (state, _) = resume(&longer, &latest, &mut resumed_sink).unwrap();
    assert!(state.time >= 0.6);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn checkpoint_with_other_zone_count_is_rejected() {
    let mut coarse = config();
    coarse.physics.num_zones = 16;
    let root = unique_temp_dir("sf_results_zones");
    let dir = OutputDir::new(root.clone(), Format::Text).unwrap();
    let mut sink = FileSink::for_config(dir.clone(), &coarse).unwrap().quiet();
    run_fresh(&coarse, &mut sink).unwrap();
    let latest = dir.latest_checkpoint().unwrap().unwrap();

    let mut fine = coarse.clone();
    fine.physics.num_zones = 200;
    let resumed_dir = OutputDir::new(unique_temp_dir("sf_results_zones_resumed"), Format::Text)
        .unwrap();
    let mut resumed_sink = FileSink::for_config(resumed_dir.clone(), &fine)
        .unwrap()
        .quiet();
    let err = resume(&fine, &latest, &mut resumed_sink).unwrap_err();

    assert!(
        matches!(
            err,
            ResultsError::Sim(SimError::Config { ref param, .. }) if param == "physics.num_zones"
        ),
        "{err}"
    );
    assert!(resumed_dir.list_checkpoints().unwrap().is_empty());
    assert!(!resumed_dir.timeseries_path().exists());

    fs::remove_dir_all(&root).ok();
    fs::remove_dir_all(resumed_dir.root()).ok();
}
