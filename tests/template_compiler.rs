//! Integration tests for slot extraction and payload compilation
//!
//! These tests drive the public template API end to end: a template is
//! parsed, its slots extracted, values filled in and the payload compiled.

use serde_json::{json, Value};

use waba_template_service::template::{
    compile, compile_with_report, extract_slots, extract_slots_from_json, ButtonSubType,
    ComponentType, FallbackKind, MessageTemplate, Parameter, VariableMap, BUTTON_PARAM_FALLBACK,
    FLOW_TOKEN_FALLBACK,
};

const FROM: &str = "+15550001111";
const TO: &str = "+15550002222";

/// Template exercising every component kind that carries slots
fn full_template() -> MessageTemplate {
    MessageTemplate::from_value(json!({
        "id": "1234567890",
        "name": "order_update",
        "language": "en_US",
        "category": "UTILITY",
        "status": "APPROVED",
        "components": [
            {
                "type": "HEADER",
                "format": "IMAGE",
                "example": {"header_handle": ["https://cdn.example.com/h.png"]}
            },
            {
                "type": "BODY",
                "text": "Hi {{1}}, order {{2}} ships on {{3}}. Thanks {{1}}!",
                "example": {"body_text": [["Ana", "A-77", "Monday"]]}
            },
            {"type": "FOOTER", "text": "Reply STOP to opt out"},
            {
                "type": "BUTTONS",
                "buttons": [
                    {"type": "URL", "text": "Track", "url": "https://shop.example.com/t/{{1}}"},
                    {"type": "QUICK_REPLY", "text": "Stop"},
                    {"type": "COPY_CODE", "example": "SAVE10", "text": "{{code}}"},
                    {"type": "FLOW", "text": "Survey", "flow_id": 98765, "navigate_screen": "WELCOME"}
                ]
            }
        ]
    }))
    .expect("fixture parses")
}

fn variables(pairs: &[(&str, &str)]) -> VariableMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn payload_json(template: &MessageTemplate, vars: &VariableMap) -> Value {
    serde_json::to_value(compile(template, FROM, TO, vars)).expect("payload serializes")
}

// =============================================================================
// Extraction -> Compilation Round Trip
// =============================================================================

mod round_trip_tests {
    use super::*;

    /// Where a slot's value must land: the component (by `type`, `sub_type`
    /// and `index`) and a JSON pointer inside it.
    struct Target {
        component_type: &'static str,
        sub_type: Option<&'static str>,
        index: Option<u64>,
        pointer: &'static str,
    }

    fn target(
        component_type: &'static str,
        sub_type: Option<&'static str>,
        index: Option<u64>,
        pointer: &'static str,
    ) -> Target {
        Target {
            component_type,
            sub_type,
            index,
            pointer,
        }
    }

    /// Expected landing spot of every slot of [`full_template`]
    fn expected_targets() -> Vec<(&'static str, Target)> {
        vec![
            ("header_media_url", target("header", None, None, "/parameters/0/image/link")),
            ("body_param_1", target("body", None, None, "/parameters/0/text")),
            ("body_param_2", target("body", None, None, "/parameters/1/text")),
            ("body_param_3", target("body", None, None, "/parameters/2/text")),
            ("button_0_param_1", target("button", Some("url"), Some(0), "/parameters/0/text")),
            ("button_2_param_code", target("button", Some("copy_code"), Some(2), "/parameters/0/text")),
            (
                "button_3_flow_token",
                target("button", Some("flow"), Some(3), "/parameters/0/action/flow_token"),
            ),
            (
                "button_3_flow_action_data",
                target("button", Some("flow"), Some(3), "/parameters/0/action/flow_action_data"),
            ),
        ]
    }

    fn find_component<'a>(payload: &'a Value, target: &Target) -> Option<&'a Value> {
        payload["template"]["components"]
            .as_array()?
            .iter()
            .find(|component| {
                component["type"] == target.component_type
                    && component.get("sub_type").and_then(Value::as_str) == target.sub_type
                    && component.get("index").and_then(Value::as_u64) == target.index
            })
    }

    #[test]
    fn test_every_extracted_slot_lands_at_its_parameter() {
        let template = full_template();
        let slot_ids: Vec<String> = extract_slots(&template).into_iter().map(|s| s.id).collect();
        let targets = expected_targets();

        let covered: Vec<&str> = targets.iter().map(|(id, _)| *id).collect();
        assert_eq!(slot_ids, covered);

        for (slot_id, target) in &targets {
            // Flow action data must be JSON to survive compilation
            let (raw, expected) = if slot_id.ends_with("_flow_action_data") {
                (r#"{"marker":"SLOT-VALUE"}"#, json!({"marker": "SLOT-VALUE"}))
            } else {
                ("SLOT-VALUE", json!("SLOT-VALUE"))
            };
            let vars = variables(&[(*slot_id, raw)]);
            let compilation = compile_with_report(&template, FROM, TO, &vars);
            assert!(
                compilation.fallbacks.iter().all(|f| f.slot_id != *slot_id),
                "slot {} fell back",
                slot_id
            );

            let payload = serde_json::to_value(&compilation.payload).expect("serializes");
            let component = find_component(&payload, target)
                .unwrap_or_else(|| panic!("no component for slot {}", slot_id));
            assert_eq!(
                component.pointer(target.pointer),
                Some(&expected),
                "slot {} landed elsewhere",
                slot_id
            );

            // The value appears nowhere else in the payload
            let wire = payload.to_string();
            assert_eq!(wire.matches("SLOT-VALUE").count(), 1, "slot {}", slot_id);
        }
    }

    #[test]
    fn test_extracted_slot_ids() {
        let ids: Vec<String> = extract_slots(&full_template())
            .into_iter()
            .map(|slot| slot.id)
            .collect();

        assert_eq!(
            ids,
            vec![
                "header_media_url",
                "body_param_1",
                "body_param_2",
                "body_param_3",
                "button_0_param_1",
                "button_2_param_code",
                "button_3_flow_token",
                "button_3_flow_action_data",
            ]
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let template = full_template();
        let vars = variables(&[("body_param_1", "Ana"), ("header_media_url", "https://x/y.png")]);

        let first = compile(&template, FROM, TO, &vars);
        let second = compile(&template, FROM, TO, &vars);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_is_repeatable() {
        let template = full_template();
        assert_eq!(extract_slots(&template), extract_slots(&template));
    }
}

// =============================================================================
// Compilation Scenarios
// =============================================================================

mod compile_tests {
    use super::*;

    #[test]
    fn test_positional_body_with_repeated_token() {
        let template = full_template();
        let vars = variables(&[
            ("body_param_1", "Ana"),
            ("body_param_2", "A-77"),
            ("body_param_3", "Monday"),
        ]);
        let payload = payload_json(&template, &vars);

        let body = payload["template"]["components"]
            .as_array()
            .and_then(|c| c.iter().find(|c| c["type"] == "body"))
            .expect("body component");
        assert_eq!(
            body["parameters"],
            json!([
                {"type": "text", "text": "Ana"},
                {"type": "text", "text": "A-77"},
                {"type": "text", "text": "Monday"}
            ])
        );
    }

    #[test]
    fn test_envelope_fields() {
        let payload = payload_json(&full_template(), &VariableMap::new());
        assert_eq!(payload["from"], FROM);
        assert_eq!(payload["to"], TO);
        assert_eq!(payload["type"], "template");
        assert_eq!(payload["template"]["name"], "order_update");
        assert_eq!(payload["template"]["lang_code"], "en_US");
    }

    #[test]
    fn test_named_parameters_carry_parameter_name() {
        let template = MessageTemplate::from_value(json!({
            "name": "welcome",
            "language": "en",
            "parameter_format": "NAMED",
            "components": [
                {"type": "HEADER", "format": "TEXT", "text": "Hello {{first_name}}"},
                {"type": "BODY", "text": "Your code is {{code}}"}
            ]
        }))
        .expect("parses");
        let vars = variables(&[("header_param_first_name", "Ana"), ("body_param_code", "991")]);

        let payload = payload_json(&template, &vars);
        assert_eq!(
            payload["template"]["components"],
            json!([
                {
                    "type": "header",
                    "parameters": [{"type": "text", "text": "Ana", "parameter_name": "first_name"}]
                },
                {
                    "type": "body",
                    "parameters": [{"type": "text", "text": "991", "parameter_name": "code"}]
                }
            ])
        );
    }

    #[test]
    fn test_media_header_link() {
        let template = full_template();
        let vars = variables(&[("header_media_url", "https://cdn.example.com/promo.png")]);
        let payload = compile(&template, FROM, TO, &vars);

        let header = &payload.template.components[0];
        assert_eq!(header.component_type, ComponentType::Header);
        assert!(matches!(
            &header.parameters[0],
            Parameter::Image { image } if image.link == "https://cdn.example.com/promo.png"
        ));
    }

    #[test]
    fn test_missing_media_url_omits_header() {
        let template = full_template();
        let compilation = compile_with_report(&template, FROM, TO, &VariableMap::new());

        assert!(compilation
            .payload
            .template
            .components
            .iter()
            .all(|c| c.component_type != ComponentType::Header));
        assert!(compilation
            .fallbacks
            .iter()
            .any(|f| f.slot_id == "header_media_url" && f.kind == FallbackKind::MediaOmitted));
    }

    #[test]
    fn test_fallbacks_with_no_variables() {
        let template = full_template();
        let compilation = compile_with_report(&template, FROM, TO, &VariableMap::new());
        let components = &compilation.payload.template.components;

        // Body keeps raw tokens
        let body = components
            .iter()
            .find(|c| c.component_type == ComponentType::Body)
            .expect("body");
        assert!(matches!(&body.parameters[0], Parameter::Text { text, .. } if text == "{{1}}"));

        // URL and copy-code buttons get the placeholder value
        let url = components
            .iter()
            .find(|c| c.sub_type == Some(ButtonSubType::Url))
            .expect("url button");
        assert_eq!(url.index, Some(0));
        assert!(matches!(
            &url.parameters[0],
            Parameter::Text { text, .. } if text == BUTTON_PARAM_FALLBACK
        ));

        let code = components
            .iter()
            .find(|c| c.sub_type == Some(ButtonSubType::CopyCode))
            .expect("copy code button");
        assert_eq!(code.index, Some(2));

        // Flow button gets the default token and data built from the definition
        let flow = components
            .iter()
            .find(|c| c.sub_type == Some(ButtonSubType::Flow))
            .expect("flow button");
        assert_eq!(flow.index, Some(3));
        match &flow.parameters[0] {
            Parameter::Action { action } => {
                assert_eq!(action.flow_token, FLOW_TOKEN_FALLBACK);
                assert_eq!(
                    action.flow_action_data,
                    Some(json!({"flow_id": 98765, "navigate_screen": "WELCOME"}))
                );
            }
            other => panic!("unexpected parameter {:?}", other),
        }
    }

    #[test]
    fn test_malformed_flow_action_data_becomes_empty_object() {
        let template = full_template();
        let vars = variables(&[
            ("button_3_flow_token", "tok-1"),
            ("button_3_flow_action_data", "not json"),
        ]);
        let compilation = compile_with_report(&template, FROM, TO, &vars);

        let flow = compilation
            .payload
            .template
            .components
            .iter()
            .find(|c| c.sub_type == Some(ButtonSubType::Flow))
            .expect("flow button");
        match &flow.parameters[0] {
            Parameter::Action { action } => {
                assert_eq!(action.flow_token, "tok-1");
                assert_eq!(action.flow_action_data, Some(json!({})));
            }
            other => panic!("unexpected parameter {:?}", other),
        }
        assert!(compilation
            .fallbacks
            .iter()
            .any(|f| f.kind == FallbackKind::MalformedFlowActionData));
    }

    #[test]
    fn test_template_without_slots_compiles_to_no_components() {
        let template = MessageTemplate::from_value(json!({
            "name": "hello_world",
            "language": "en_US",
            "components": [
                {"type": "HEADER", "format": "TEXT", "text": "Hello World"},
                {"type": "BODY", "text": "Welcome and congratulations!"},
                {"type": "FOOTER", "text": "WhatsApp Business Platform sample message"}
            ]
        }))
        .expect("parses");

        assert!(extract_slots(&template).is_empty());
        let compilation = compile_with_report(&template, FROM, TO, &VariableMap::new());
        assert!(compilation.payload.template.components.is_empty());
        assert!(compilation.fallbacks.is_empty());
    }
}

// =============================================================================
// Malformed Input
// =============================================================================

mod malformed_input_tests {
    use super::*;

    #[test]
    fn test_unparseable_json_yields_no_slots() {
        assert!(extract_slots_from_json("{not json").is_empty());
        assert!(extract_slots_from_json(r#"{"name": 12}"#).is_empty());
    }

    #[test]
    fn test_unknown_component_and_button_types_are_ignored() {
        let template = MessageTemplate::from_value(json!({
            "name": "future",
            "language": "en",
            "components": [
                {"type": "SOMETHING_NEW", "payload": {"x": 1}},
                {"type": "BODY", "text": "Hi {{1}}"},
                {"type": "BUTTONS", "buttons": [{"type": "HOLOGRAM", "text": "?"}]}
            ]
        }))
        .expect("unknown kinds are tolerated");

        let ids: Vec<String> = extract_slots(&template).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["body_param_1"]);

        let payload = compile(&template, FROM, TO, &variables(&[("body_param_1", "x")]));
        assert_eq!(payload.template.components.len(), 1);
    }
}
