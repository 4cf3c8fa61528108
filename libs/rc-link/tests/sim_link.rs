#![cfg(feature = "sim")]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rc_link::command::MotorCommand;
use rc_link::sim::{self, Vehicle, VehicleConfig};
use rc_link::{HttpTransport, JoystickId, LinkState, Point, PointerEvent, PointerId, Session, SessionConfig};
use tokio::net::TcpListener;

const DEADLINE: Duration = Duration::from_secs(5);

fn fast_config(addr: SocketAddr) -> SessionConfig {
    SessionConfig {
        url: format!("http://{addr}"),
        send_period_ms: 20,
        telemetry_period_ms: 50,
        ping_period_ms: 100,
        ..Default::default()
    }
}

fn session(config: SessionConfig) -> Session {
    let transport = HttpTransport::new(&config).expect("valid url");
    Session::new(config, Arc::new(transport))
}

async fn spawn_vehicle() -> (SocketAddr, Vehicle) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let vehicle = Vehicle::new(VehicleConfig {
        addr,
        ..Default::default()
    });
    tokio::spawn(sim::serve(listener, vehicle.clone()));
    (addr, vehicle)
}

async fn eventually(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(DEADLINE, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_drives_simulated_vehicle() {
    let (addr, vehicle) = spawn_vehicle().await;
    let session = session(fast_config(addr));
    session.start();

    let mut dashboard = session.dashboard();
    tokio::time::timeout(
        DEADLINE,
        dashboard.wait_for(|d| d.link == LinkState::Connected && d.telemetry.is_some()),
    )
    .await
    .expect("link did not come up")
    .unwrap();
    assert_eq!(dashboard.borrow().battery_text(), "87%");

    session.input(PointerEvent::Down {
        pointer: PointerId::Mouse,
        target: JoystickId::Throttle,
        center: Point::new(50.0, 50.0),
        position: Point::new(50.0, 0.0),
    });
    eventually(|| vehicle.snapshot().motors == MotorCommand::new(50, 0)).await;

    session.emergency_stop().await.unwrap();
    let state = vehicle.snapshot();
    assert_eq!(state.emergency_stops, 1);
    assert_eq!(session.axes(), (0, 0));

    eventually(|| vehicle.snapshot().motors == MotorCommand::default()).await;
    session.dispose();
}

#[tokio::test]
async fn test_unreachable_vehicle_stays_disconnected() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let session = session(fast_config(addr));
    session.start();
    tokio::time::sleep(Duration::from_millis(350)).await;

    assert_eq!(session.link_state(), LinkState::Disconnected);
    let dashboard = session.dashboard().borrow().clone();
    assert_eq!(dashboard.latency_text(), "--ms");
    assert_eq!(dashboard.battery_text(), "--%");
}
