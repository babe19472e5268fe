//! Scenario document loading.
//!
//! Raw documents describe agents per group: each key of a group is either a
//! scalar broadcast to all `num` agents or a list with one entry per agent.
//! Keys prefixed with `deg_` hold degrees; the prefix is stripped and the
//! values converted to radians.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::config::{AgentGroup, CommonConfig, Fence, ScenarioConfig};
use super::error::{ScenarioError, ScenarioResult};
use crate::rollout::AgentProperty;

const DEGREE_PREFIX: &str = "deg_";

impl ScenarioConfig {
    /// Parses a scenario from JSON text.
    pub fn from_json_str(text: &str) -> ScenarioResult<Self> {
        let raw: Value = serde_json::from_str(text)?;
        Self::from_value(raw)
    }

    /// Parses a scenario from YAML text.
    pub fn from_yaml_str(text: &str) -> ScenarioResult<Self> {
        let raw: Value = serde_yaml::from_str(text)?;
        Self::from_value(raw)
    }

    /// Reads and parses a scenario file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, everything else
    /// as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path.extension().and_then(|ext| ext.to_str());
        if matches!(extension, Some("yaml" | "yml")) {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }

    /// Builds a scenario from an already-decoded document.
    pub fn from_value(raw: Value) -> ScenarioResult<Self> {
        let root = as_object(&raw, "<root>")?;

        let common_raw = root
            .get("common")
            .ok_or_else(|| ScenarioError::MissingKey("common".into()))?;
        let common: CommonConfig = serde_json::from_value(common_raw.clone())?;
        common.validate()?;

        let groups_raw = root
            .get("agent_groups")
            .ok_or_else(|| ScenarioError::MissingKey("agent_groups".into()))?;
        let mut agent_groups = Vec::new();
        for (name, group) in as_object(groups_raw, "agent_groups")? {
            let agents = expand_group(name, group)?
                .into_iter()
                .map(|props| serde_json::from_value::<AgentProperty>(Value::Object(props)))
                .collect::<Result<Vec<_>, _>>()?;
            agent_groups.push(AgentGroup {
                name: name.clone(),
                agents,
            });
        }

        let mut fences = Vec::new();
        if let Some(fences_raw) = root.get("fence_group") {
            for (name, fence) in as_object(fences_raw, "fence_group")? {
                fences.push(Fence {
                    name: name.clone(),
                    properties: expand_fence(name, fence)?,
                });
            }
        }

        Ok(Self {
            common,
            default_agent: root.get("default_agent").cloned(),
            agent_groups,
            fences,
        })
    }
}

fn as_object<'a>(value: &'a Value, key: &str) -> ScenarioResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| ScenarioError::InvalidType {
        key: key.to_string(),
        expected: "an object",
    })
}

/// Splits a key into its stored name and the factor its values are scaled by.
fn strip_degree(key: &str) -> (&str, Option<f64>) {
    match key.strip_prefix(DEGREE_PREFIX) {
        Some(stripped) => (stripped, Some(1f64.to_radians())),
        None => (key, None),
    }
}

fn scale(value: &Value, factor: Option<f64>, key: &str) -> ScenarioResult<Value> {
    let Some(factor) = factor else {
        return Ok(value.clone());
    };
    value
        .as_f64()
        .map(|v| Value::from(v * factor))
        .ok_or_else(|| ScenarioError::InvalidType {
            key: key.to_string(),
            expected: "a number",
        })
}

/// Expands one agent group into a property mapping per agent.
fn expand_group(name: &str, group: &Value) -> ScenarioResult<Vec<Map<String, Value>>> {
    let group = as_object(group, name)?;
    let num = group
        .get("num")
        .ok_or_else(|| ScenarioError::MissingKey(format!("agent_groups.{name}.num")))?
        .as_u64()
        .filter(|n| *n > 0)
        .ok_or_else(|| ScenarioError::InvalidGroupSize {
            group: name.to_string(),
        })? as usize;

    let mut agents = vec![Map::new(); num];
    for (raw_key, value) in group {
        if raw_key == "num" {
            continue;
        }
        let (key, factor) = strip_degree(raw_key);
        match value {
            Value::Array(items) => {
                if items.len() != num {
                    return Err(ScenarioError::ListLength {
                        group: name.to_string(),
                        key: raw_key.clone(),
                        expected: num,
                        got: items.len(),
                    });
                }
                for (agent, item) in agents.iter_mut().zip(items) {
                    agent.insert(key.to_string(), scale(item, factor, raw_key)?);
                }
            }
            scalar => {
                let scaled = scale(scalar, factor, raw_key)?;
                for agent in &mut agents {
                    agent.insert(key.to_string(), scaled.clone());
                }
            }
        }
    }
    Ok(agents)
}

fn expand_fence(name: &str, fence: &Value) -> ScenarioResult<Map<String, Value>> {
    let mut expanded = Map::new();
    for (raw_key, value) in as_object(fence, name)? {
        let (key, factor) = strip_degree(raw_key);
        let converted = match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| scale(item, factor, raw_key))
                    .collect::<ScenarioResult<Vec<_>>>()?,
            ),
            scalar => scale(scalar, factor, raw_key)?,
        };
        expanded.insert(key.to_string(), converted);
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use serde_json::json;

    use super::*;
    use crate::scenario::ResetMode;

    fn document() -> Value {
        json!({
            "common": {
                "time_limit": 30.0,
                "reward_coef": {"crash": -10.0, "reach": 10.0, "potential": 1.0, "time_penalty": -0.01},
                "reset_mode": "random",
                "field_range": [0.0, 10.0, -5.0, 5.0]
            },
            "default_agent": {"L_car": 0.3},
            "agent_groups": {
                "cars": {
                    "num": 2,
                    "R_safe": 0.4,
                    "init_x": [1.0, 2.0],
                    "init_y": 0.0,
                    "deg_init_theta": [90.0, 180.0],
                    "init_target_x": 8.0,
                    "init_target_y": [1.0, -1.0],
                    "L_axis": 0.25
                },
                "bus": {
                    "num": 1,
                    "R_safe": 1.0,
                    "init_x": 5.0,
                    "init_y": 3.0,
                    "init_target_x": 5.0,
                    "init_target_y": -3.0,
                    "init_movable": false
                }
            },
            "fence_group": {
                "wall": {"start": [0.0, 0.0], "deg_angles": [0.0, 90.0], "height": 1.5}
            }
        })
    }

    #[test]
    fn parses_common_section() {
        let scenario = ScenarioConfig::from_value(document()).unwrap();
        assert_eq!(scenario.common.time_limit, 30.0);
        assert_eq!(scenario.common.reset_mode, ResetMode::Random);
        assert_eq!(scenario.common.reward_coef.crash, -10.0);
        assert_eq!(scenario.common.field_range.min_y, -5.0);
        assert!(scenario.default_agent.is_some());
    }

    #[test]
    fn broadcasts_scalars_and_splits_lists() {
        let scenario = ScenarioConfig::from_value(document()).unwrap();
        let cars = &scenario.agent_groups[0].agents;
        assert_eq!(cars.len(), 2);
        assert_eq!(cars[0].init_x, 1.0);
        assert_eq!(cars[1].init_x, 2.0);
        assert_eq!(cars[0].init_target_x, 8.0);
        assert_eq!(cars[1].init_target_x, 8.0);
        assert_eq!(cars[1].init_target_y, -1.0);
        assert_eq!(cars[0].extra.get("L_axis"), Some(&json!(0.25)));
    }

    #[test]
    fn converts_degree_keys() {
        let scenario = ScenarioConfig::from_value(document()).unwrap();
        let cars = &scenario.agent_groups[0].agents;
        assert!((cars[0].init_theta - PI / 2.0).abs() < 1e-12);
        assert!((cars[1].init_theta - PI).abs() < 1e-12);
    }

    #[test]
    fn keeps_group_order_and_defaults() {
        let scenario = ScenarioConfig::from_value(document()).unwrap();
        let names: Vec<_> = scenario.agent_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["cars", "bus"]);
        assert_eq!(scenario.agent_count(), 3);
        let bus = &scenario.agent_groups[1].agents[0];
        assert!(!bus.init_movable);
        assert_eq!(bus.init_vel_b, 0.0);
        assert!(scenario.agent_groups[0].agents[0].init_movable);
    }

    #[test]
    fn fences_pass_through_with_degree_conversion() {
        let scenario = ScenarioConfig::from_value(document()).unwrap();
        let wall = &scenario.fences[0];
        assert_eq!(wall.name, "wall");
        assert_eq!(wall.properties["height"], json!(1.5));
        assert_eq!(wall.properties["start"], json!([0.0, 0.0]));
        let angles = wall.properties["angles"].as_array().unwrap();
        assert!((angles[1].as_f64().unwrap() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_reward_coefficient_is_fatal() {
        let mut doc = document();
        doc["common"]["reward_coef"]
            .as_object_mut()
            .unwrap()
            .remove("potential");
        let err = ScenarioConfig::from_value(doc).unwrap_err();
        assert!(matches!(err, ScenarioError::Json(_)));
        assert!(err.to_string().contains("potential"));
    }

    #[test]
    fn missing_common_is_fatal() {
        let mut doc = document();
        doc.as_object_mut().unwrap().remove("common");
        let err = ScenarioConfig::from_value(doc).unwrap_err();
        assert!(matches!(err, ScenarioError::MissingKey(k) if k == "common"));
    }

    #[test]
    fn missing_required_agent_key_is_fatal() {
        let mut doc = document();
        doc["agent_groups"]["bus"]
            .as_object_mut()
            .unwrap()
            .remove("R_safe");
        assert!(ScenarioConfig::from_value(doc).is_err());
    }

    #[test]
    fn list_length_must_match_group_size() {
        let mut doc = document();
        doc["agent_groups"]["cars"]["init_x"] = json!([1.0, 2.0, 3.0]);
        let err = ScenarioConfig::from_value(doc).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::ListLength { expected: 2, got: 3, .. }
        ));
    }

    #[test]
    fn rejects_unknown_reset_mode() {
        let mut doc = document();
        doc["common"]["reset_mode"] = json!("teleport");
        assert!(ScenarioConfig::from_value(doc).is_err());
    }

    #[test]
    fn rejects_empty_field_range() {
        let mut doc = document();
        doc["common"]["field_range"] = json!([5.0, 5.0, 0.0, 1.0]);
        let err = ScenarioConfig::from_value(doc).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidFieldRange { .. }));
    }

    #[test]
    fn rejects_zero_sized_group() {
        let mut doc = document();
        doc["agent_groups"]["bus"]["num"] = json!(0);
        let err = ScenarioConfig::from_value(doc).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidGroupSize { .. }));
    }

    const YAML_DOCUMENT: &str = "\
common:
  time_limit: 30.0
  reward_coef: {crash: -10.0, reach: 10.0, potential: 1.0, time_penalty: -0.01}
  reset_mode: random
  field_range: [0.0, 10.0, -5.0, 5.0]
default_agent:
  L_car: 0.3
agent_groups:
  cars:
    num: 2
    R_safe: 0.4
    init_x: [1.0, 2.0]
    init_y: 0.0
    deg_init_theta: [90.0, 180.0]
    init_target_x: 8.0
    init_target_y: [1.0, -1.0]
    L_axis: 0.25
  bus:
    num: 1
    R_safe: 1.0
    init_x: 5.0
    init_y: 3.0
    init_target_x: 5.0
    init_target_y: -3.0
    init_movable: false
fence_group:
  wall:
    start: [0.0, 0.0]
    deg_angles: [0.0, 90.0]
    height: 1.5
";

    #[test]
    fn yaml_and_json_documents_agree() {
        let from_yaml = ScenarioConfig::from_yaml_str(YAML_DOCUMENT).unwrap();
        let from_json = ScenarioConfig::from_value(document()).unwrap();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn malformed_yaml_is_fatal() {
        let err = ScenarioConfig::from_yaml_str("common: [unclosed").unwrap_err();
        assert!(matches!(err, ScenarioError::Yaml(_)));
    }

    #[test]
    fn picks_format_from_extension() {
        let dir = std::env::temp_dir().join(format!("mfsim-{}", crate::generate_id()));
        fs::create_dir_all(&dir).unwrap();
        let yaml = dir.join("scenario.yaml");
        let json = dir.join("scenario.json");
        fs::write(&yaml, YAML_DOCUMENT).unwrap();
        fs::write(&json, serde_json::to_string(&document()).unwrap()).unwrap();

        let from_yaml = ScenarioConfig::from_path(&yaml).unwrap();
        let from_json = ScenarioConfig::from_path(&json).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(from_yaml.agent_count(), 3);
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn parses_json_text() {
        let text = serde_json::to_string(&document()).unwrap();
        let scenario = ScenarioConfig::from_json_str(&text).unwrap();
        assert_eq!(scenario.agent_count(), 3);
    }
}
