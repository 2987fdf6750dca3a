//! End-to-end runs of the simulated board

use std::io::Read;
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use tessera_core::TaskState;
use tessera_display::Screen;
use tessera_sim::{run, RunOptions, RunSummary, SimConfig, SimTransport};

type TestScreen = Screen<80, 26>;

/// Every period at one second, run fifty times faster
fn fast_config(extra: &str) -> SimConfig {
    let text = format!(
        "[dashboard]\nperiod_s = 1\n\n[cell]\nperiod_s = 1\n\n[poster]\nperiod_s = 1\nthing = \"sim_test\"\n\n{extra}"
    );
    SimConfig::parse(&text).unwrap()
}

fn fast_options(passes: u32) -> RunOptions {
    RunOptions {
        passes: Some(passes),
        speed: 50,
        transport: SimTransport::Log,
    }
}

fn run_on_screen(config: &SimConfig, options: &RunOptions) -> (TestScreen, RunSummary) {
    run(config, options, TestScreen::new()).unwrap()
}

#[test]
fn test_elements_laid_out_in_registration_order() {
    let (screen, summary) = run_on_screen(&fast_config(""), &fast_options(2));

    assert_eq!(summary.last_pass.rendered, 3);
    assert!(summary.last_pass.is_clean());

    // Grid row 0 starts on screen row 1; columns step by the window width
    assert_eq!(screen.text_at(2, 0, 17), Some("| Accelerometer |"));
    assert_eq!(screen.text_at(2, 20, 16), Some("|  Networking  |"));
    assert_eq!(screen.text_at(2, 40, 17), Some("|    Button     |"));
}

#[test]
fn test_cell_values_reach_the_dashboard() {
    let (screen, summary) = run_on_screen(&fast_config(""), &fast_options(20));

    assert_eq!(summary.cell, TaskState::Running);
    assert_eq!(screen.text_at(5, 20, 16), Some("| carrier: VZW |"));
    assert_ne!(screen.text_at(3, 20, 16), Some("|  rsrp: 255   |"));
}

#[test]
fn test_missing_accelerometer_stays_at_sentinel() {
    let config = fast_config("[sim]\naccel_present = false\n");
    let (screen, summary) = run_on_screen(&config, &fast_options(5));

    assert_eq!(summary.accel, TaskState::Faulted);
    assert_eq!(summary.cell, TaskState::Running);
    assert_eq!(screen.text_at(3, 0, 17), Some("|    x:   0     |"));
    assert_eq!(screen.text_at(5, 0, 17), Some("|    z:   0     |"));
}

#[test]
fn test_link_down_blocks_posts() {
    let config = fast_config("[sim]\nlink_up = false\n");
    let (screen, summary) = run_on_screen(&config, &fast_options(20));

    assert_eq!(summary.posted, 0);
    assert!(summary.post_failures > 0);
    assert_eq!(screen.text_at(5, 20, 16), Some("| carrier: N/A |"));
}

#[test]
fn test_button_presses_are_counted_and_shown() {
    let config = fast_config("[sim]\nbutton_interval_ms = 500\n");
    let (screen, summary) = run_on_screen(&config, &fast_options(20));

    assert_eq!(summary.button, TaskState::Running);
    assert!(summary.presses > 0);
    let expected = format!("|  Count:{:4}   |", summary.presses);
    assert_eq!(screen.text_at(3, 40, expected.len()), Some(expected.as_str()));
}

#[test]
fn test_cell_recovers_from_slow_modem() {
    let config = fast_config("[sim]\nlate_reply_every = 5\n");
    let (screen, summary) = run_on_screen(&config, &fast_options(20));

    assert_eq!(summary.cell, TaskState::Running);
    assert!(summary.cell_skipped > 0, "{summary:?}");
    assert!(summary.cell_published > summary.cell_skipped, "{summary:?}");
    assert_eq!(screen.text_at(5, 20, 16), Some("| carrier: VZW |"));
}

#[test]
fn test_blinky_toggles_led() {
    let (_, summary) = run_on_screen(&fast_config(""), &fast_options(20));

    assert_eq!(summary.blinky, TaskState::Running);
    assert!(summary.led_transitions > 0);
}

#[test]
fn test_poster_delivers_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut received = String::new();
        stream.read_to_string(&mut received).unwrap();
        received
    });

    let options = RunOptions {
        transport: SimTransport::Tcp(addr),
        ..fast_options(20)
    };
    let (_, summary) = run_on_screen(&fast_config(""), &options);
    assert!(summary.posted > 0);

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /dweet/for/sim_test?rsrp="), "{request}");
    assert!(request.contains("&carrier="), "{request}");
    assert!(request.ends_with(" HTTP/1.1\r\n\r\n"), "{request}");
}

#[test]
fn test_final_pass_counted() {
    let (_, summary) = run_on_screen(&fast_config(""), &fast_options(1));
    assert_eq!(summary.passes, 2);
}

#[test]
fn test_invalid_config_is_refused() {
    let mut config = SimConfig::default();
    config.harness.dashboard.columns = 0;

    let result = run(&config, &fast_options(1), TestScreen::new());
    assert!(result.is_err());
}

#[test]
fn test_example_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("sim.toml");
    let config = SimConfig::load(&path).unwrap();

    assert_eq!(config.harness, SimConfig::default().harness);
    assert_eq!(config.sim.operator, "311480");
}
