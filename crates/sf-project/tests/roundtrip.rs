use sf_models::Advection1d;
use sf_project::{Project, load, load_json, load_yaml, save, save_json, save_yaml};
use sf_sim::{Policy, ScheduleSpec};

fn sample_project() -> Project<Advection1d> {
    let mut project = Project::new(
        "Roundtrip",
        Advection1d {
            num_zones: 32,
            domain_length: 3.0,
            velocity: -1.25,
        },
    );
    project.driver.rk_order = 3;
    project.driver.max_iter = Some(100);
    project.driver.message = ScheduleSpec::nearest(0.5);
    project.output.format = "json".to_string();
    project
}

#[test]
fn roundtrip_yaml_project() {
    let project = sample_project();
    let path = std::env::temp_dir().join("sf_project_roundtrip.yaml");

    save_yaml(&path, &project).unwrap();
    let loaded: Project<Advection1d> = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json_project() {
    let project = sample_project();
    let path = std::env::temp_dir().join("sf_project_roundtrip.json");

    save_json(&path, &project).unwrap();
    let loaded: Project<Advection1d> = load_json(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn extension_selects_the_format() {
    let project = sample_project();
    let path = std::env::temp_dir().join("sf_project_by_extension.yml");
    save(&path, &project).unwrap();
    let loaded: Project<Advection1d> = load(&path).unwrap();
    assert_eq!(loaded.driver.message.policy, Policy::Nearest);
    assert_eq!(project, loaded);

    let bad = std::env::temp_dir().join("sf_project_by_extension.toml");
    assert!(save(&bad, &project).is_err());
}

#[test]
fn invalid_project_is_not_saved() {
    let mut project = sample_project();
    project.driver.cfl = -1.0;
    let path = std::env::temp_dir().join("sf_project_invalid.yaml");
    let _ = std::fs::remove_file(&path);

    assert!(save_yaml(&path, &project).is_err());
    assert!(!path.exists());
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let path = std::env::temp_dir().join("sf_project_exact_aux.yaml");
    std::fs::write(
        &path,
        "version: 1\nname: bad\ndriver:\n  checkpoint:\n    interval: 0.1\n    time_kind: 1\n    policy: exact\nphysics:\n  num_zones: 8\n  domain_length: 1.0\n  velocity: 1.0\n",
    )
    .unwrap();
    let err = load_yaml::<Advection1d>(&path).unwrap_err();
    assert!(err.to_string().contains("checkpoint.time_kind"), "{err}");
}
