//! Planning data model
//!
//! Scene snapshots arrive as loosely-shaped JSON. Rather than deserializing
//! into rigid structs (which would reject a scene over one odd field), the
//! records keep the raw mapping and expose typed accessors, each with a
//! stated default for absent or mistyped values.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

pub type JsonMap = Map<String, Value>;

/// Action name emitted when nothing better is available
pub const DONE_ACTION: &str = "Done";

/// A 3D vector as reported by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Read `{x, y, z}`; missing components default to 0.0.
    /// A bare number is read as a yaw (rotation about y).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let axis = |k: &str| map.get(k).and_then(Value::as_f64).unwrap_or(0.0);
                Some(Self::new(axis("x"), axis("y"), axis("z")))
            }
            Value::Number(n) => n.as_f64().map(|yaw| Self::new(0.0, yaw, 0.0)),
            _ => None,
        }
    }
}

/// Agent position and heading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentPose {
    /// Absent when the scene omits it
    pub position: Option<Vec3>,
    /// Absent when the scene omits it
    pub rotation: Option<Vec3>,
}

impl AgentPose {
    pub fn from_value(value: &Value) -> Self {
        Self {
            position: value.get("position").and_then(Vec3::from_value),
            rotation: value.get("rotation").and_then(Vec3::from_value),
        }
    }
}

/// One simulator object with absent-tolerant field access
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectRecord(JsonMap);

impl ObjectRecord {
    pub fn new(fields: JsonMap) -> Self {
        Self(fields)
    }

    /// `None` unless the value is a mapping
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned().map(Self)
    }

    pub fn fields(&self) -> &JsonMap {
        &self.0
    }

    /// Boolean field; absent or non-boolean reads as false
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// String field; absent or non-string reads as `None`
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// List-of-strings field; absent, null, or non-list reads as empty.
    /// Non-string entries are skipped.
    pub fn id_list(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Defaults to "Unknown"
    pub fn object_type(&self) -> &str {
        self.text("objectType").unwrap_or("Unknown")
    }

    /// Defaults to "unknown"
    pub fn object_id(&self) -> &str {
        self.text("objectId").unwrap_or("unknown")
    }

    pub fn visible(&self) -> bool {
        self.flag("visible")
    }

    pub fn pickupable(&self) -> bool {
        self.flag("pickupable")
    }

    pub fn is_picked_up(&self) -> bool {
        self.flag("isPickedUp")
    }

    pub fn receptacle(&self) -> bool {
        self.flag("receptacle")
    }

    pub fn openable(&self) -> bool {
        self.flag("openable")
    }

    pub fn is_open(&self) -> bool {
        self.flag("isOpen")
    }

    pub fn toggleable(&self) -> bool {
        self.flag("toggleable")
    }

    pub fn is_toggled(&self) -> bool {
        self.flag("isToggled")
    }

    pub fn dirtyable(&self) -> bool {
        self.flag("dirtyable")
    }

    pub fn is_dirty(&self) -> bool {
        self.flag("isDirty")
    }

    pub fn cookable(&self) -> bool {
        self.flag("cookable")
    }

    pub fn is_cooked(&self) -> bool {
        self.flag("isCooked")
    }

    pub fn is_sliced(&self) -> bool {
        self.flag("isSliced")
    }

    /// Defaults to `None` (treated as ambient)
    pub fn temperature(&self) -> Option<&str> {
        self.text("temperature")
    }

    pub fn parent_receptacles(&self) -> Vec<&str> {
        self.id_list("parentReceptacles")
    }

    pub fn receptacle_object_ids(&self) -> Vec<&str> {
        self.id_list("receptacleObjectIds")
    }

    /// Defaults to `None` (rendered as unknown)
    pub fn position(&self) -> Option<Vec3> {
        self.0.get("position").and_then(Vec3::from_value)
    }
}

/// Read-only scene snapshot attached to a trial
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneInfo {
    pub agent: AgentPose,
    /// Held objects, kept raw: simulators report either ids or full records
    pub inventory: Vec<Value>,
    pub objects: Vec<ObjectRecord>,
}

impl SceneInfo {
    /// Decode a scene mapping. Anything missing decodes as empty.
    pub fn from_value(value: &Value) -> Self {
        let list = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        };

        Self {
            agent: value
                .get("agent")
                .map(AgentPose::from_value)
                .unwrap_or_default(),
            inventory: list("inventoryObjects"),
            objects: list("objects")
                .iter()
                .filter_map(ObjectRecord::from_value)
                .collect(),
        }
    }

    /// Ids of held objects. Entries may be bare id strings or object records.
    pub fn held_object_ids(&self) -> Vec<String> {
        self.inventory
            .iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(id.clone()),
                Value::Object(map) => map
                    .get("objectId")
                    .or_else(|| map.get("objectType"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect()
    }
}

/// One planning request
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub trial_id: String,
    pub goal_instruction: String,
    pub metadata: SceneInfo,
}

impl Trial {
    pub fn new(
        trial_id: impl Into<String>,
        goal_instruction: impl Into<String>,
        metadata: SceneInfo,
    ) -> Self {
        Self {
            trial_id: trial_id.into(),
            goal_instruction: goal_instruction.into(),
            metadata,
        }
    }

    /// Decode a trial mapping; `None` if the value is not a mapping.
    ///
    /// Numeric ids are accepted and kept as their JSON text.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        let trial_id = match map.get("trial_id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let goal_instruction = map
            .get("goal_instruction")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let metadata = map
            .get("metadata")
            .map(SceneInfo::from_value)
            .unwrap_or_default();

        Some(Self {
            trial_id,
            goal_instruction,
            metadata,
        })
    }

    /// The result-mapping key: the trimmed id, or `None` when blank
    pub fn key(&self) -> Option<&str> {
        let key = self.trial_id.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// One executable step. Always carries a non-empty `action`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActionRecord(JsonMap);

impl ActionRecord {
    /// A bare action with no arguments
    pub fn new(action: impl Into<String>) -> Self {
        let mut fields = JsonMap::new();
        fields.insert("action".into(), Value::String(action.into()));
        Self(fields)
    }

    /// The terminal no-op used for fallbacks
    pub fn done() -> Self {
        Self::new(DONE_ACTION)
    }

    /// Wrap a mapping whose `action` is a non-empty string
    pub fn from_map(fields: JsonMap) -> Option<Self> {
        let has_action = fields
            .get("action")
            .and_then(Value::as_str)
            .map(|a| !a.trim().is_empty())
            .unwrap_or(false);
        has_action.then_some(Self(fields))
    }

    pub fn action(&self) -> &str {
        self.0
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or(DONE_ACTION)
    }

    pub fn object_id(&self) -> Option<&str> {
        self.0.get("object_id").and_then(Value::as_str)
    }

    pub fn receptacle_id(&self) -> Option<&str> {
        self.0.get("receptacle_id").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &JsonMap {
        &self.0
    }
}

/// Trial id to planned actions, in emission order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanResult {
    entries: Vec<(String, Vec<ActionRecord>)>,
}

impl PlanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, trial_id: impl Into<String>, actions: Vec<ActionRecord>) {
        let trial_id = trial_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == trial_id) {
            Some(entry) => entry.1 = actions,
            None => self.entries.push((trial_id, actions)),
        }
    }

    pub fn get(&self, trial_id: &str) -> Option<&[ActionRecord]> {
        self.entries
            .iter()
            .find(|(id, _)| id == trial_id)
            .map(|(_, actions)| actions.as_slice())
    }

    pub fn contains(&self, trial_id: &str) -> bool {
        self.get(trial_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ActionRecord])> {
        self.entries
            .iter()
            .map(|(id, actions)| (id.as_str(), actions.as_slice()))
    }
}

impl Serialize for PlanResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, actions) in &self.entries {
            map.serialize_entry(id, actions)?;
        }
        map.end()
    }
}
