//! Outbound-to-inbound loop: a widget press leaves one panel as a wire
//! frame and lands in another panel's widget by address.

use tactile_core::widgets::{Orientation, Slider};
use tactile_core::{Panel, PointerEvent, PointerPhase, Registry, Target, Value, WidgetOptions};
use tactile_osc::{Connection, Router, Transport, TransportError, TransportState};

/// In-memory transport capturing sent frames.
#[derive(Debug, Default)]
struct LoopbackTransport {
    open: bool,
    sent: Vec<String>,
}

impl Transport for LoopbackTransport {
    fn state(&self) -> TransportState {
        if self.open {
            TransportState::Open
        } else {
            TransportState::Closed
        }
    }

    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.sent.push(text.to_string());
        Ok(())
    }
}

#[test]
fn slider_press_reaches_remote_widget_by_address() {
    // Sending side: a remote-targeted fader.
    let mut sender_panel = Panel::new(200.0, 50.0);
    let mut sender_registry = Registry::new();
    let fader = Slider::new(
        Orientation::Horizontal,
        WidgetOptions {
            min: 0.0,
            max: 100.0,
            key: Some("/fader".to_string()),
            target: Some(Target::Remote),
            ..WidgetOptions::default()
        },
    );
    sender_panel.add(Box::new(fader), &mut sender_registry).unwrap();

    let mut connection = Connection::new(
        LoopbackTransport {
            open: true,
            ..LoopbackTransport::default()
        },
        "mixer",
    );
    connection.register().unwrap();

    sender_panel
        .dispatch_pointer(
            &PointerEvent::new(1, PointerPhase::Down, 100.0, 25.0, 0),
            Some(&mut connection),
        )
        .unwrap();

    let frames = &connection.transport_mut().sent;
    assert_eq!(frames.len(), 2, "handshake plus one value frame");
    let value_frame = frames[1].clone();
    let json: serde_json::Value = serde_json::from_str(&value_frame).unwrap();
    assert_eq!(json["type"], "osc");
    assert_eq!(json["address"], "/fader");
    assert_eq!(json["parameters"], serde_json::json!([50.0]));

    // Receiving side: a widget registered under the same address. The
    // inbound value is raw-domain, so replay the raw 0.5.
    let mut receiver_panel = Panel::new(300.0, 40.0);
    let mut receiver_registry = Registry::new();
    let remote_fader = Slider::new(
        Orientation::Horizontal,
        WidgetOptions {
            min: 0.0,
            max: 10.0,
            key: Some("/fader".to_string()),
            ..WidgetOptions::default()
        },
    );
    let receiver_id = receiver_panel
        .add(Box::new(remote_fader), &mut receiver_registry)
        .unwrap();

    let mut router = Router::new();
    let outcome = router
        .route_json(
            r#"{"type":"osc","address":"/fader","parameters":[0.5]}"#,
            &receiver_registry,
            &mut receiver_panel,
            None,
        )
        .unwrap();
    assert_eq!(outcome, tactile_osc::RouteOutcome::Widget(receiver_id));
    assert_eq!(
        receiver_panel
            .widget(receiver_id)
            .unwrap()
            .core()
            .pipeline
            .public_value(),
        Some(Value::Scalar(5.0))
    );
}

#[test]
fn press_while_disconnected_fails_loudly() {
    let mut panel = Panel::new(200.0, 50.0);
    let mut registry = Registry::new();
    let fader = Slider::new(
        Orientation::Horizontal,
        WidgetOptions {
            key: Some("/fader".to_string()),
            target: Some(Target::Remote),
            ..WidgetOptions::default()
        },
    );
    panel.add(Box::new(fader), &mut registry).unwrap();

    let mut connection = Connection::new(LoopbackTransport::default(), "mixer");
    let result = panel.dispatch_pointer(
        &PointerEvent::new(1, PointerPhase::Down, 100.0, 25.0, 0),
        Some(&mut connection),
    );
    assert!(result.is_err(), "closed transport must error synchronously");
}
