//! # Reflection
//!
//! Field-level read, write and copy for component structs, driven by a
//! per-type descriptor table instead of memory layout.
//!
//! ## Design Philosophy
//!
//! - Each reflected type builds one [`TypeInfo`] on first use and shares it
//! - Leaf types implement [`Visit`] directly; structs delegate to their table
//! - Reads are partial: payload fields that are absent leave the target alone

mod descriptor;
mod macros;
mod visit;

pub use descriptor::{FieldInfo, Reflect, TypeInfo, TypeInfoCell};
pub use visit::Visit;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use crate::{Reflect, ReflectError, Visit};

    #[derive(Clone, Default, Debug, PartialEq)]
    struct Frame {
        x: i32,
        y: i32,
    }

    #[derive(Clone, Default, Debug, PartialEq)]
    struct Sprite {
        file: String,
        frames: Vec<Frame>,
        groups: BTreeMap<String, Frame>,
        zorder: Option<i32>,
    }

    crate::reflect!(Frame { x: i32, y: i32 });
    crate::reflect!(Sprite {
        file: String,
        frames: Vec<Frame>,
        groups: BTreeMap<String, Frame>,
        zorder: Option<i32>,
    });

    #[test]
    fn test_nested_read() {
        let mut sprite = Sprite::default();
        sprite
            .read(&json!({
                "file": "block.png",
                "frames": [{"x": 1}, {"x": 2, "y": 3}],
                "groups": {"idle": {"y": 4}},
            }))
            .unwrap();

        assert_eq!(sprite.file, "block.png");
        assert_eq!(sprite.frames, vec![Frame { x: 1, y: 0 }, Frame { x: 2, y: 3 }]);
        assert_eq!(sprite.groups["idle"], Frame { x: 0, y: 4 });
        assert_eq!(sprite.zorder, None);
    }

    #[test]
    fn test_nested_error_path() {
        let mut sprite = Sprite::default();
        let err = sprite
            .read(&json!({"groups": {"idle": {"x": "left"}}}))
            .unwrap_err();
        assert!(
            matches!(err, ReflectError::TypeMismatch { ref path, .. } if path == "groups.idle.x"),
            "{err}"
        );
    }

    #[test]
    fn test_copy_matches_clone() {
        let mut source = Sprite::default();
        source
            .read(&json!({"file": "a", "frames": [{"x": 5}], "zorder": 2}))
            .unwrap();

        let mut copy = Sprite {
            file: "stale".into(),
            frames: vec![Frame::default(); 3],
            ..Sprite::default()
        };
        copy.copy_from(&source);
        assert_eq!(copy, source);
    }

    #[test]
    fn test_write_round_trip_order() {
        let sprite = Sprite {
            file: "b".into(),
            ..Sprite::default()
        };
        let written = sprite.write();
        let keys: Vec<_> = written.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["file", "frames", "groups", "zorder"]);
        assert_eq!(Sprite::type_info().fields().len(), 4);
    }
}
