use cefkit_common::{ExceptionRecord, FrameId, ListValue, ProcessMessage, ProtocolError, Value};

use super::*;

fn sample_args() -> ListValue {
    let mut nested = ListValue::new();
    nested.push("inner");
    nested.push(false);
    let mut args = ListValue::new();
    args.push(1_i64 << 40);
    args.push("text");
    args.push(true);
    args.push(nested);
    args
}

fn one_of_each() -> Vec<Message> {
    vec![
        Message::ContextCreated {
            frame_id: FrameId(1 << 33),
        },
        Message::ContextReleased {
            frame_id: FrameId(-1),
        },
        Message::UncaughtException {
            frame_id: FrameId(7),
            exception: ExceptionRecord {
                message: "x is not defined".into(),
                line_number: 12,
                start_position: 100,
                end_position: 105,
                start_column: 3,
                end_column: 8,
            },
        },
        Message::EvaluateRequest(EvaluateRequest {
            id: 42,
            frame_id: FrameId(7),
            script: "1+1".into(),
        }),
        Message::EvaluateResponse(Reply {
            id: 42,
            result: Ok(Value::Int(2)),
        }),
        Message::MethodCallRequest(MethodCall {
            id: 3,
            object_id: 9,
            method: "save".into(),
            args: sample_args(),
        }),
        Message::MethodCallResponse(Reply {
            id: 3,
            result: Err("no such method".into()),
        }),
        Message::CallbackInvokeRequest(CallbackInvoke {
            callback_id: 5,
            id: 6,
            args: sample_args(),
        }),
        Message::CallbackInvokeResponse(CallbackReply {
            callback_id: 5,
            reply: Reply {
                id: 6,
                result: Ok(Value::List(sample_args())),
            },
        }),
        Message::CallbackDestroyRequest { callback_id: 5 },
        Message::ObjectsBound(vec![
            BoundObject {
                name: "bridge".into(),
                is_cached: true,
                already_bound: false,
            },
            BoundObject {
                name: "files".into(),
                is_cached: false,
                already_bound: true,
            },
        ]),
        Message::FocusedNodeChanged(Some(FocusedNode {
            tag_name: "INPUT".into(),
            editable: true,
        })),
    ]
}

#[test]
fn every_name_survives_the_wire() {
    let messages = one_of_each();
    let mut seen: Vec<MessageName> = messages.iter().map(Message::name).collect();
    seen.dedup();
    assert_eq!(seen, MessageName::ALL.to_vec());

    for message in messages {
        let wire = message.encode();
        assert_eq!(wire.name(), message.name().as_str());
        assert_eq!(wire.arguments().len(), message.name().arity());
        assert_eq!(Message::decode(&wire).unwrap(), message);
        assert_eq!(Message::decode(&wire).unwrap().encode(), wire);
    }
}

#[test]
fn empty_focus_and_empty_bound_list() {
    for message in [
        Message::FocusedNodeChanged(None),
        Message::ObjectsBound(Vec::new()),
    ] {
        let wire = message.encode();
        assert_eq!(wire.arguments().list(0).map(ListValue::len), Some(0));
        assert_eq!(Message::decode(&wire).unwrap(), message);
    }
}

#[test]
fn exception_layout_is_fixed() {
    let wire = one_of_each()[2].encode();
    let args = wire.arguments();
    assert_eq!(args.int(0), Some(7));
    assert_eq!(args.string(1), Some("x is not defined"));
    let numbers: Vec<i64> = (2..7).filter_map(|i| args.int(i)).collect();
    assert_eq!(numbers, vec![12, 100, 105, 3, 8]);
}

#[test]
fn evaluate_response_layout() {
    let ok = Message::EvaluateResponse(Reply {
        id: 42,
        result: Ok(Value::Int(2)),
    })
    .encode();
    assert_eq!(ok.arguments().int(0), Some(42));
    assert_eq!(ok.arguments().bool(1), Some(true));
    assert_eq!(ok.arguments().get(2), Some(&Value::Int(2)));

    let err = Message::EvaluateResponse(Reply {
        id: 43,
        result: Err("boom".into()),
    })
    .encode();
    assert_eq!(err.arguments().bool(1), Some(false));
    assert_eq!(err.arguments().string(2), Some("boom"));
}

#[test]
fn unknown_name_is_rejected() {
    let err = Message::decode(&ProcessMessage::new("root-object-request")).unwrap_err();
    assert_eq!(err, ProtocolError::UnknownMessage("root-object-request".into()));
}

#[test]
fn wrong_arity_is_rejected() {
    let mut args = ListValue::new();
    args.push(1_i64);
    args.push(2_i64);
    let wire = ProcessMessage::with_arguments("on-context-created-request", args);
    assert_eq!(
        Message::decode(&wire).unwrap_err(),
        ProtocolError::Arity {
            name: "on-context-created-request",
            expected: 1,
            actual: 2,
        }
    );
}

#[test]
fn wrong_type_is_rejected() {
    let mut args = ListValue::new();
    args.push("42");
    args.push(7_i64);
    args.push("1+1");
    let wire = ProcessMessage::with_arguments("evaluate-script-request", args);
    assert_eq!(
        Message::decode(&wire).unwrap_err(),
        ProtocolError::ArgumentType {
            name: "evaluate-script-request",
            index: 0,
            expected: "int",
            actual: "string",
        }
    );
}

#[test]
fn oversized_line_number_is_out_of_range() {
    let mut wire = one_of_each()[2].encode();
    wire.arguments_mut().set(2, i64::from(i32::MAX) + 1);
    assert_eq!(
        Message::decode(&wire).unwrap_err(),
        ProtocolError::OutOfRange {
            name: "on-uncaught-exception",
            index: 2,
        }
    );
}

#[test]
fn malformed_nested_entries_are_rejected() {
    let mut entry = ListValue::new();
    entry.push("bridge");
    entry.push(true);
    let mut objects = ListValue::new();
    objects.push(entry);
    let mut args = ListValue::new();
    args.push(objects);
    let wire = ProcessMessage::with_arguments("objects-bound-in-script", args);
    assert!(matches!(
        Message::decode(&wire),
        Err(ProtocolError::Arity { expected: 3, actual: 2, .. })
    ));

    let mut node = ListValue::new();
    node.push("INPUT");
    let mut args = ListValue::new();
    args.push(node);
    let wire = ProcessMessage::with_arguments("focused-node-changed", args);
    assert!(Message::decode(&wire).is_err());
}
