//! Hierarchical JSON archives.
//!
//! Groups become objects, fields become members, and anonymous items are
//! collected in an array under the reserved key `"[]"`. Reads are keyed, so
//! member order does not matter. JSON has no representation for NaN or
//! infinity; writing one is an error.

use std::io::Write;

use serde_json::{Map, Value};

use crate::path::{GroupPath, check_name};
use crate::{ArchiveError, ArchiveReader, ArchiveResult, ArchiveWriter};

/// Key holding the anonymous items of a group.
pub const ITEMS_KEY: &str = "[]";

enum Slot {
    Named(String),
    Item,
}

pub struct JsonWriter<W: Write> {
    out: W,
    root: Map<String, Value>,
    open: Vec<(Slot, Map<String, Value>)>,
    path: GroupPath,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            root: Map::new(),
            open: Vec::new(),
            path: GroupPath::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn current(&mut self) -> &mut Map<String, Value> {
        match self.open.last_mut() {
            Some((_, map)) => map,
            None => &mut self.root,
        }
    }

    fn insert(&mut self, name: &str, value: Value) -> ArchiveResult<()> {
        check_name(name)?;
        self.current().insert(name.to_string(), value);
        Ok(())
    }

    fn finite(&self, name: &str, value: f64) -> ArchiveResult<Value> {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| ArchiveError::NonFinite {
                field: name.to_string(),
                group: self.path.label(),
            })
    }
}

impl<W: Write> ArchiveWriter for JsonWriter<W> {
    fn write_int(&mut self, name: &str, value: i64) -> ArchiveResult<()> {
        self.insert(name, Value::from(value))
    }

    fn write_float(&mut self, name: &str, value: f64) -> ArchiveResult<()> {
        let value = self.finite(name, value)?;
        self.insert(name, value)
    }

    fn write_string(&mut self, name: &str, value: &str) -> ArchiveResult<()> {
        self.insert(name, Value::from(value))
    }

    fn write_float_array(&mut self, name: &str, values: &[f64]) -> ArchiveResult<()> {
        let array = values
            .iter()
            .map(|v| self.finite(name, *v))
            .collect::<ArchiveResult<Vec<Value>>>()?;
        self.insert(name, Value::Array(array))
    }

    fn write_int_array(&mut self, name: &str, values: &[i64]) -> ArchiveResult<()> {
        let array = values.iter().map(|v| Value::from(*v)).collect();
        self.insert(name, Value::Array(array))
    }

    fn begin_group(&mut self, name: &str) -> ArchiveResult<()> {
        check_name(name)?;
        self.open.push((Slot::Named(name.to_string()), Map::new()));
        self.path.push(name);
        Ok(())
    }

    fn begin_item(&mut self) -> ArchiveResult<()> {
        self.open.push((Slot::Item, Map::new()));
        self.path.push_item();
        Ok(())
    }

    fn end_group(&mut self) -> ArchiveResult<()> {
        let Some((slot, map)) = self.open.pop() else {
            return Err(ArchiveError::Unbalanced {
                group: self.path.label(),
            });
        };
        self.path.pop();
        let parent = self.current();
        match slot {
            Slot::Named(name) => {
                parent.insert(name, Value::Object(map));
            }
            Slot::Item => {
                let items = parent
                    .entry(ITEMS_KEY)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = items {
                    items.push(Value::Object(map));
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> ArchiveResult<()> {
        if !self.open.is_empty() {
            return Err(ArchiveError::Unbalanced {
                group: self.path.label(),
            });
        }
        let root = Value::Object(std::mem::take(&mut self.root));
        serde_json::to_writer_pretty(&mut self.out, &root)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

enum Step {
    Key(String),
    Item(usize),
}

struct Frame {
    step: Step,
    next_item: usize,
}

/// Keyed reader over a parsed JSON document.
pub struct JsonReader {
    root: Value,
    root_next_item: usize,
    frames: Vec<Frame>,
    path: GroupPath,
}

impl JsonReader {
    pub fn new(source: &str) -> ArchiveResult<Self> {
        let root: Value = serde_json::from_str(source)?;
        if !root.is_object() {
            return Err(ArchiveError::Parse {
                group: GroupPath::new().label(),
                message: "top level of a JSON archive must be an object".to_string(),
            });
        }
        Ok(Self {
            root,
            root_next_item: 0,
            frames: Vec::new(),
            path: GroupPath::new(),
        })
    }

    fn current(&self) -> ArchiveResult<&Map<String, Value>> {
        let mut node = &self.root;
        for frame in &self.frames {
            node = match &frame.step {
                Step::Key(key) => node.get(key),
                Step::Item(index) => node.get(ITEMS_KEY).and_then(|items| items.get(*index)),
            }
            .ok_or_else(|| ArchiveError::Unbalanced {
                group: self.path.label(),
            })?;
        }
        node.as_object().ok_or_else(|| ArchiveError::Parse {
            group: self.path.label(),
            message: "group is not an object".to_string(),
        })
    }

    fn field(&self, name: &str) -> ArchiveResult<&Value> {
        self.current()?
            .get(name)
            .ok_or_else(|| ArchiveError::MissingField {
                field: name.to_string(),
                group: self.path.label(),
            })
    }

    fn mismatch(&self, name: &str, expected: &'static str) -> ArchiveError {
        ArchiveError::TypeMismatch {
            field: name.to_string(),
            group: self.path.label(),
            expected,
        }
    }

    fn array(&self, name: &str) -> ArchiveResult<&Vec<Value>> {
        self.field(name)?
            .as_array()
            .ok_or_else(|| self.mismatch(name, "an array"))
    }
}

impl ArchiveReader for JsonReader {
    fn read_int(&mut self, name: &str) -> ArchiveResult<i64> {
        self.field(name)?
            .as_i64()
            .ok_or_else(|| self.mismatch(name, "an integer"))
    }

    fn read_float(&mut self, name: &str) -> ArchiveResult<f64> {
        self.field(name)?
            .as_f64()
            .ok_or_else(|| self.mismatch(name, "a number"))
    }

    fn read_string(&mut self, name: &str) -> ArchiveResult<String> {
        self.field(name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(name, "a string"))
    }

    fn read_float_array(&mut self, name: &str) -> ArchiveResult<Vec<f64>> {
        self.array(name)?
            .iter()
            .map(|v| v.as_f64().ok_or_else(|| self.mismatch(name, "an array of numbers")))
            .collect()
    }

    fn read_int_array(&mut self, name: &str) -> ArchiveResult<Vec<i64>> {
        self.array(name)?
            .iter()
            .map(|v| v.as_i64().ok_or_else(|| self.mismatch(name, "an array of integers")))
            .collect()
    }

    fn begin_group(&mut self, name: &str) -> ArchiveResult<()> {
        if !self.field(name)?.is_object() {
            return Err(self.mismatch(name, "a group"));
        }
        self.frames.push(Frame {
            step: Step::Key(name.to_string()),
            next_item: 0,
        });
        self.path.push(name);
        Ok(())
    }

    fn next_item(&mut self) -> ArchiveResult<bool> {
        let index = match self.frames.last() {
            Some(frame) => frame.next_item,
            None => self.root_next_item,
        };
        let available = self
            .current()?
            .get(ITEMS_KEY)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        if index >= available {
            return Ok(false);
        }
        match self.frames.last_mut() {
            Some(frame) => frame.next_item += 1,
            None => self.root_next_item += 1,
        }
        self.frames.push(Frame {
            step: Step::Item(index),
            next_item: 0,
        });
        self.path.push_item();
        Ok(true)
    }

    fn end_group(&mut self) -> ArchiveResult<()> {
        if self.frames.pop().is_none() {
            return Err(ArchiveError::Unbalanced {
                group: self.path.label(),
            });
        }
        self.path.pop();
        Ok(())
    }

    fn group_path(&self) -> String {
        self.path.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(build: impl FnOnce(&mut JsonWriter<Vec<u8>>) -> ArchiveResult<()>) -> String {
        let mut writer = JsonWriter::new(Vec::new());
        build(&mut writer).unwrap();
        writer.finish().unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn items_land_under_reserved_key() {
        let text = encode(|w| {
            w.begin_group("g")?;
            w.begin_item()?;
            w.write_int("k", 1)?;
            w.end_group()?;
            w.end_group()
        });
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["g"][ITEMS_KEY][0]["k"], Value::from(1));
    }

    #[test]
    fn reads_are_order_independent() {
        let mut r = JsonReader::new(r#"{"g": {"b": 2.5, "a": 1}}"#).unwrap();
        r.begin_group("g").unwrap();
        assert_eq!(r.read_float("b").unwrap(), 2.5);
        assert_eq!(r.read_int("a").unwrap(), 1);
        r.end_group().unwrap();
    }

    #[test]
    fn integers_read_as_floats() {
        let mut r = JsonReader::new(r#"{"x": 3}"#).unwrap();
        assert_eq!(r.read_float("x").unwrap(), 3.0);
    }

    #[test]
    fn rejects_non_finite() {
        let mut w = JsonWriter::new(Vec::new());
        w.begin_group("g").unwrap();
        let err = w.write_float("x", f64::NAN).unwrap_err();
        assert!(matches!(err, ArchiveError::NonFinite { .. }));
    }

    #[test]
    fn missing_field_names_path() {
        let mut r = JsonReader::new(r#"{"outer": {"inner": {}}}"#).unwrap();
        r.begin_group("outer").unwrap();
        r.begin_group("inner").unwrap();
        let msg = r.read_string("label").unwrap_err().to_string();
        assert!(msg.contains("'label'"), "{msg}");
        assert!(msg.contains("outer/inner"), "{msg}");
    }

    #[test]
    fn nested_items_advance_independently() {
        let text = encode(|w| {
            w.begin_group("g")?;
            for i in 0..3 {
                w.begin_item()?;
                w.write_int("i", i)?;
                w.end_group()?;
            }
            w.end_group()
        });
        let mut r = JsonReader::new(&text).unwrap();
        r.begin_group("g").unwrap();
        let mut seen = Vec::new();
        while r.next_item().unwrap() {
            seen.push(r.read_int("i").unwrap());
            r.end_group().unwrap();
        }
        r.end_group().unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
