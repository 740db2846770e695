//! Every format satisfies the same archive contract.

use proptest::prelude::*;
use sf_archive::{
    ArchiveReader, ArchiveResult, ArchiveWriter, Format, Persist, read_group, read_items,
    write_group, write_items,
};

#[derive(Clone, Debug, PartialEq)]
struct Probe {
    label: String,
    position: Vec<f64>,
    cells: Vec<i64>,
    weight: f64,
}

impl Persist for Probe {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        ar.write_string("label", &self.label)?;
        ar.write_float_array("position", &self.position)?;
        ar.write_int_array("cells", &self.cells)?;
        ar.write_float("weight", self.weight)
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        Ok(Self {
            label: ar.read_string("label")?,
            position: ar.read_float_array_exact("position", 3)?,
            cells: ar.read_int_array("cells")?,
            weight: ar.read_float("weight")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Survey {
    step: i64,
    probes: Vec<Probe>,
}

impl Persist for Survey {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        ar.write_int("step", self.step)?;
        write_items(ar, "probes", &self.probes)
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        Ok(Self {
            step: ar.read_int("step")?,
            probes: read_items(ar, "probes")?,
        })
    }
}

fn sample_survey() -> Survey {
    Survey {
        step: 17,
        probes: vec![
            Probe {
                label: "inlet \"west\"".to_string(),
                position: vec![0.0, 0.5, -1.25],
                cells: vec![3, 4],
                weight: 0.1,
            },
            Probe {
                label: "outlet".to_string(),
                position: vec![1.0, 1e-300, 7.0],
                cells: vec![],
                weight: 2.0 / 3.0,
            },
        ],
    }
}

fn temp_file(tag: &str, format: Format) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("sf_archive_formats");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{tag}.{}", format.extension()))
}

#[test]
fn nested_records_survive_every_format() {
    let survey = sample_survey();
    for format in Format::ALL {
        let path = temp_file("survey", format);
        let mut writer = format.create_writer(&path).unwrap();
        write_group(writer.as_mut(), "survey", &survey).unwrap();
        writer.finish().unwrap();

        let mut reader = format.open_reader(&path).unwrap();
        let restored: Survey = read_group(reader.as_mut(), "survey").unwrap();
        assert_eq!(restored, survey, "format {format}");
    }
}

#[test]
fn fixed_size_array_length_is_checked() {
    for format in Format::ALL {
        let path = temp_file("short", format);
        let mut writer = format.create_writer(&path).unwrap();
        writer.begin_group("p").unwrap();
        writer.write_float_array("position", &[1.0, 2.0]).unwrap();
        writer.end_group().unwrap();
        writer.finish().unwrap();

        let mut reader = format.open_reader(&path).unwrap();
        reader.begin_group("p").unwrap();
        let err = reader.read_float_array_exact("position", 3).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("position") && msg.contains("'p'"), "{format}: {msg}");
    }
}

#[test]
fn unbalanced_documents_are_refused() {
    for format in Format::ALL {
        let path = temp_file("unbalanced", format);
        let mut writer = format.create_writer(&path).unwrap();
        writer.begin_group("open").unwrap();
        assert!(writer.finish().is_err(), "format {format}");
    }
}

#[test]
fn missing_group_reports_path() {
    for format in Format::ALL {
        let path = temp_file("missing", format);
        let mut writer = format.create_writer(&path).unwrap();
        writer.begin_group("checkpoint").unwrap();
        writer.write_int("iteration", 4).unwrap();
        writer.end_group().unwrap();
        writer.finish().unwrap();

        let mut reader = format.open_reader(&path).unwrap();
        reader.begin_group("checkpoint").unwrap();
        let err = reader.read_int("count").unwrap_err().to_string();
        assert!(err.contains("count"), "{format}: {err}");
        assert!(err.contains("checkpoint"), "{format}: {err}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn finite_values_are_bit_exact(
        scalar in -1e300_f64..1e300,
        values in prop::collection::vec(-1e12_f64..1e12, 0..16),
        count in any::<i64>(),
    ) {
        for format in Format::ALL {
            let path = temp_file("prop", format);
            let mut writer = format.create_writer(&path).unwrap();
            writer.write_float("scalar", scalar).unwrap();
            writer.write_float_array("values", &values).unwrap();
            writer.write_int("count", count).unwrap();
            writer.finish().unwrap();

            let mut reader = format.open_reader(&path).unwrap();
            prop_assert_eq!(reader.read_float("scalar").unwrap().to_bits(), scalar.to_bits());
            let restored = reader.read_float_array("values").unwrap();
            prop_assert_eq!(restored.len(), values.len());
            for (a, b) in restored.iter().zip(&values) {
                prop_assert_eq!(a.to_bits(), b.to_bits());
            }
            prop_assert_eq!(reader.read_int("count").unwrap(), count);
        }
    }
}
