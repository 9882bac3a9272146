//! Property-based tests for the `OpenAI` translation layer
//!
//! - Message translation never produces empty output
//! - Text and tool-call counts survive translation
//! - Tool results always become "tool" role messages tied to their call id
//! - Responses with empty function names are rejected

#![allow(clippy::redundant_closure_for_method_calls)]

use super::openai::{
    normalize_response, translate_message, OpenAIChoice, OpenAIFunctionCall, OpenAIMessage,
    OpenAIResponse, OpenAIToolCall,
};
use super::types::{ContentBlock, LlmMessage, MessageRole};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_text_block() -> impl Strategy<Value = ContentBlock> {
    "[a-zA-Z0-9 _.!?,]{1,80}".prop_map(|text| ContentBlock::Text { text })
}

fn arb_json_args() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        "[0-9]{4}-[0-9]{2}-[0-9]{2}".prop_map(|date| serde_json::json!({ "date": date })),
        ("[a-zA-Z]{1,12}", 1u32..20).prop_map(|(name, seats)| {
            serde_json::json!({ "name": name, "seats": seats, "date": "2026-10-20" })
        }),
    ]
}

fn arb_tool_use_block() -> impl Strategy<Value = ContentBlock> {
    ("call_[a-z0-9]{6}", "[a-z_]{3,20}", arb_json_args())
        .prop_map(|(id, name, input)| ContentBlock::ToolUse { id, name, input })
}

fn arb_tool_result_block() -> impl Strategy<Value = ContentBlock> {
    ("call_[a-z0-9]{6}", "[a-zA-Z0-9 ]{0,40}", any::<bool>()).prop_map(
        |(tool_use_id, content, is_error)| ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        },
    )
}

fn arb_user_message() -> impl Strategy<Value = LlmMessage> {
    prop_oneof![
        proptest::collection::vec(arb_text_block(), 1..3),
        proptest::collection::vec(arb_tool_result_block(), 1..3),
    ]
    .prop_map(|content| LlmMessage {
        role: MessageRole::User,
        content,
    })
}

fn arb_assistant_message() -> impl Strategy<Value = LlmMessage> {
    (
        proptest::collection::vec(arb_text_block(), 0..2),
        proptest::collection::vec(arb_tool_use_block(), 0..3),
    )
        .prop_map(|(mut text, tools)| {
            text.extend(tools);
            LlmMessage {
                role: MessageRole::Assistant,
                content: text,
            }
        })
}

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    prop_oneof![arb_user_message(), arb_assistant_message()]
}

fn response_with_calls(content: Option<String>, calls: Vec<(String, String)>) -> OpenAIResponse {
    let tool_calls = calls
        .into_iter()
        .enumerate()
        .map(|(i, (name, arguments))| OpenAIToolCall {
            id: format!("call_{i}"),
            r#type: "function".to_string(),
            function: OpenAIFunctionCall { name, arguments },
        })
        .collect::<Vec<_>>();
    OpenAIResponse {
        choices: vec![OpenAIChoice {
            message: OpenAIMessage {
                role: "assistant".to_string(),
                content,
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                tool_call_id: None,
            },
        }],
        usage: None,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_translate_never_empty_output(msg in arb_message()) {
        prop_assert!(!translate_message(&msg).is_empty());
    }

    #[test]
    fn prop_translate_preserves_tool_use_count(msg in arb_assistant_message()) {
        let expected = msg
            .content
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
            .count();
        let actual: usize = translate_message(&msg)
            .iter()
            .map(|m| m.tool_calls.as_ref().map_or(0, |c| c.len()))
            .sum();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn prop_translate_preserves_text(msg in arb_message()) {
        let expected = msg.text();
        let translated = translate_message(&msg);
        let joined: String = translated
            .iter()
            .filter(|m| m.role != "tool")
            .filter_map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("");
        prop_assert_eq!(expected.replace('\n', ""), joined.replace('\n', ""));
    }

    #[test]
    fn prop_tool_results_become_tool_role(msg in arb_user_message()) {
        let result_ids: Vec<String> = msg
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.clone()),
                _ => None,
            })
            .collect();
        let tool_msgs: Vec<_> = translate_message(&msg)
            .into_iter()
            .filter(|m| m.role == "tool")
            .collect();
        prop_assert_eq!(result_ids.len(), tool_msgs.len());
        for (id, m) in result_ids.iter().zip(&tool_msgs) {
            prop_assert_eq!(Some(id.as_str()), m.tool_call_id.as_deref());
        }
    }

    #[test]
    fn prop_normalize_keeps_named_calls(names in proptest::collection::vec("[a-z_]{3,20}", 1..4)) {
        let calls = names
            .iter()
            .map(|n| (n.clone(), "{\"date\":\"2026-10-20\"}".to_string()))
            .collect();
        let normalized = normalize_response(response_with_calls(None, calls)).unwrap();
        let got: Vec<String> = normalized.tool_uses().into_iter().map(|u| u.name).collect();
        prop_assert_eq!(got, names);
    }

    #[test]
    fn prop_normalize_rejects_empty_name(text in proptest::option::of("[a-z ]{1,20}")) {
        let calls = vec![(String::new(), "{}".to_string())];
        prop_assert!(normalize_response(response_with_calls(text, calls)).is_err());
    }
}
