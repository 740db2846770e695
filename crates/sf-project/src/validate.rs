//! Project validation logic.

use sf_archive::Format;
use sf_sim::{Physics, SimError};

use crate::schema::{LATEST_VERSION, Project};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Invalid run settings: {0}")]
    Run(#[from] SimError),
}

pub fn validate_project<P: Physics>(project: &Project<P>) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    if project.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: format!("{:?}", project.name),
            reason: "must not be empty".to_string(),
        });
    }

    if project.output.format.parse::<Format>().is_err() {
        return Err(ValidationError::InvalidValue {
            field: "output.format".to_string(),
            value: project.output.format.clone(),
            reason: "expected text, binary or json".to_string(),
        });
    }

    project.driver.validate()?;
    project.physics.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_models::Advection1d;
    use sf_sim::ScheduleSpec;

    #[test]
    fn default_project_is_valid() {
        let project = Project::new("demo", Advection1d::default());
        validate_project(&project).unwrap();
    }

    #[test]
    fn rejects_future_version() {
        let mut project = Project::new("demo", Advection1d::default());
        project.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_unknown_output_format() {
        let mut project = Project::new("demo", Advection1d::default());
        project.output.format = "hdf5".to_string();
        let err = validate_project(&project).unwrap_err();
        assert!(err.to_string().contains("output.format"), "{err}");
    }

    #[test]
    fn driver_errors_name_the_parameter() {
        let mut project = Project::new("demo", Advection1d::default());
        project.driver.product = ScheduleSpec::exact(0.1).with_time_kind(1);
        let err = validate_project(&project).unwrap_err();
        assert!(err.to_string().contains("product.time_kind"), "{err}");
    }

    #[test]
    fn physics_errors_name_the_parameter() {
        let mut project = Project::new("demo", Advection1d::default());
        project.physics.num_zones = 0;
        let err = validate_project(&project).unwrap_err();
        assert!(err.to_string().contains("physics.num_zones"), "{err}");
    }
}
