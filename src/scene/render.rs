//! Render scene snapshots as prompt text
//!
//! Pure formatting: no I/O, deterministic for a given input.

use crate::core::types::{AgentPose, ObjectRecord, SceneInfo, Vec3};

/// Rendered in place of an empty object list
pub const NO_OBJECTS: &str = "No objects available.";

/// Rendered when an object has none of the descriptive properties
pub const NO_SPECIAL_PROPERTIES: &str = "no special properties";

/// Temperature value the simulator reports for ambient objects
const AMBIENT_TEMPERATURE: &str = "RoomTemp";

/// Render objects, one line each
///
/// With `filter_visible`, objects not currently visible are skipped and no
/// visibility tag is appended (every remaining object is visible).
pub fn render_objects(objects: &[ObjectRecord], filter_visible: bool) -> String {
    if objects.is_empty() {
        return NO_OBJECTS.to_string();
    }

    objects
        .iter()
        .filter(|obj| !filter_visible || obj.visible())
        .map(|obj| render_object(obj, filter_visible))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_object(obj: &ObjectRecord, filter_visible: bool) -> String {
    let mut line = format!(
        "- {} ({}): {}; position {}",
        obj.object_type(),
        obj.object_id(),
        property_clause(obj),
        render_vec(obj.position()),
    );

    if !filter_visible {
        line.push_str(if obj.visible() {
            " [visible]"
        } else {
            " [not visible]"
        });
    }

    line
}

/// Comma-joined descriptive properties in a fixed order
pub fn property_clause(obj: &ObjectRecord) -> String {
    let mut props: Vec<String> = Vec::new();

    if obj.pickupable() {
        props.push(if obj.is_picked_up() {
            "pickupable (held)".into()
        } else {
            "pickupable".into()
        });
    }

    if obj.receptacle() {
        props.push("receptacle".into());
    }

    if obj.openable() {
        props.push(if obj.is_open() {
            "openable (open)".into()
        } else {
            "openable (closed)".into()
        });
    }

    if obj.toggleable() {
        props.push(if reports_toggled_on(obj) {
            "toggleable (on)".into()
        } else {
            "toggleable (off)".into()
        });
    }

    if obj.dirtyable() {
        props.push((if obj.is_dirty() { "dirty" } else { "clean" }).to_string());
    }

    if obj.cookable() {
        props.push((if obj.is_cooked() { "cooked" } else { "uncooked" }).to_string());
    }

    if obj.is_sliced() {
        props.push("sliced".into());
    }

    if let Some(temp) = obj.temperature() {
        if temp != AMBIENT_TEMPERATURE {
            props.push(format!("temperature: {}", temp));
        }
    }

    let parents = obj.parent_receptacles();
    if !parents.is_empty() {
        props.push(format!("inside: {}", parents.join(", ")));
    }

    let contents = obj.receptacle_object_ids();
    if !contents.is_empty() {
        props.push(format!(
            "contains {} object(s): {}",
            contents.len(),
            contents.join(", ")
        ));
    }

    if props.is_empty() {
        NO_SPECIAL_PROPERTIES.to_string()
    } else {
        props.join(", ")
    }
}

/// Candles are always described as lit, whatever their toggle state.
/// Existing prompts were tuned against this wording.
fn reports_toggled_on(obj: &ObjectRecord) -> bool {
    obj.object_id().contains("Candle") || obj.is_toggled()
}

/// `(x=1.00, y=0.90, z=-2.50)` or `unknown`
pub fn render_vec(v: Option<Vec3>) -> String {
    match v {
        Some(v) => format!("(x={:.2}, y={:.2}, z={:.2})", v.x, v.y, v.z),
        None => "unknown".to_string(),
    }
}

/// Agent position and rotation on one line
pub fn render_pose(pose: &AgentPose) -> String {
    format!(
        "position {}, rotation {}",
        render_vec(pose.position),
        render_vec(pose.rotation)
    )
}

/// What the agent is holding
pub fn render_inventory(scene: &SceneInfo) -> String {
    let held = scene.held_object_ids();
    if held.is_empty() {
        "nothing".to_string()
    } else {
        held.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn obj(value: serde_json::Value) -> ObjectRecord {
        ObjectRecord::from_value(&value).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render_objects(&[], false), NO_OBJECTS);
        assert_eq!(render_objects(&[], true), NO_OBJECTS);
    }

    #[test]
    fn test_no_special_properties() {
        let plain = obj(json!({"objectType": "Wall", "objectId": "Wall|1", "visible": true}));
        assert_eq!(property_clause(&plain), NO_SPECIAL_PROPERTIES);

        let rendered = render_objects(&[plain], false);
        assert!(rendered.contains("Wall (Wall|1): no special properties"));
        assert!(rendered.ends_with("[visible]"));
    }

    #[test]
    fn test_filter_visible_skips_hidden() {
        let hidden = obj(json!({"objectType": "Mug", "objectId": "Mug|1", "visible": false}));
        let shown = obj(json!({"objectType": "Sink", "objectId": "Sink|1", "visible": true}));

        let rendered = render_objects(&[hidden.clone(), shown], true);
        assert!(!rendered.contains("Mug|1"));
        assert!(rendered.contains("Sink|1"));
        assert!(!rendered.contains("visible]"));

        assert_eq!(render_objects(&[hidden], true), "");
    }

    #[test]
    fn test_unfiltered_tags_visibility() {
        let hidden = obj(json!({"objectType": "Mug", "objectId": "Mug|1"}));
        assert!(render_objects(&[hidden], false).ends_with("[not visible]"));
    }

    #[test]
    fn test_property_order() {
        let fridge = obj(json!({
            "objectType": "Fridge",
            "objectId": "Fridge|1",
            "receptacle": true,
            "openable": true,
            "isOpen": false,
            "receptacleObjectIds": ["Egg|1", "Apple|2"],
        }));
        assert_eq!(
            property_clause(&fridge),
            "receptacle, openable (closed), contains 2 object(s): Egg|1, Apple|2"
        );

        let potato = obj(json!({
            "pickupable": true,
            "isPickedUp": true,
            "cookable": true,
            "isCooked": false,
            "isSliced": true,
            "temperature": "Hot",
            "parentReceptacles": ["Pan|3"],
        }));
        assert_eq!(
            property_clause(&potato),
            "pickupable (held), uncooked, sliced, temperature: Hot, inside: Pan|3"
        );
    }

    #[test]
    fn test_ambient_temperature_omitted() {
        let mug = obj(json!({"temperature": "RoomTemp", "dirtyable": true, "isDirty": true}));
        assert_eq!(property_clause(&mug), "dirty");
    }

    #[test]
    fn test_candle_always_on() {
        let candle = obj(json!({
            "objectId": "Candle|1|2|3",
            "toggleable": true,
            "isToggled": false,
        }));
        assert_eq!(property_clause(&candle), "toggleable (on)");

        let lamp = obj(json!({"objectId": "FloorLamp|1", "toggleable": true}));
        assert_eq!(property_clause(&lamp), "toggleable (off)");
    }

    #[test]
    fn test_position_rendering() {
        let mug = obj(json!({"position": {"x": 1.0, "y": 0.9, "z": -2.5}}));
        assert!(render_objects(&[mug], true).is_empty());

        let mug = obj(json!({"visible": true, "position": {"x": 1.0, "y": 0.9, "z": -2.5}}));
        assert!(render_objects(&[mug], true).ends_with("position (x=1.00, y=0.90, z=-2.50)"));

        let nowhere = obj(json!({"visible": true}));
        assert!(render_objects(&[nowhere], true).ends_with("position unknown"));
    }

    #[test]
    fn test_inventory_rendering() {
        let empty = SceneInfo::default();
        assert_eq!(render_inventory(&empty), "nothing");

        let scene = SceneInfo::from_value(&json!({"inventoryObjects": [{"objectId": "Mug|1"}]}));
        assert_eq!(render_inventory(&scene), "Mug|1");
    }

    #[test]
    fn test_pose_rendering() {
        let scene = SceneInfo::from_value(&json!({
            "agent": {"position": {"x": 0.0, "y": 0.9, "z": 1.25}, "rotation": {"y": 270}}
        }));
        assert_eq!(
            render_pose(&scene.agent),
            "position (x=0.00, y=0.90, z=1.25), rotation (x=0.00, y=270.00, z=0.00)"
        );
        assert_eq!(
            render_pose(&AgentPose::default()),
            "position unknown, rotation unknown"
        );
    }

    proptest! {
        #[test]
        fn prop_one_line_per_rendered_object(flags in proptest::collection::vec(
            (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 1..12
        )) {
            let objects: Vec<ObjectRecord> = flags
                .iter()
                .enumerate()
                .map(|(i, (visible, pickupable, openable, toggleable))| obj(json!({
                    "objectType": "Thing",
                    "objectId": format!("Thing|{}", i),
                    "visible": visible,
                    "pickupable": pickupable,
                    "openable": openable,
                    "toggleable": toggleable,
                })))
                .collect();

            let unfiltered = render_objects(&objects, false);
            prop_assert_eq!(unfiltered.lines().count(), objects.len());

            let visible_count = flags.iter().filter(|f| f.0).count();
            let filtered = render_objects(&objects, true);
            prop_assert_eq!(filtered.lines().count(), visible_count);
        }
    }
}
