use volume_gestures::commands::{Gesture, default_gesture_bindings};
use volume_gestures::system::MockVolume;

mod test_utils;
use test_utils::{ControlConfigBuilder, TestWorld};

#[test]
fn test_gesture_dispatch_reaches_the_handlers() {
    let world = TestWorld::new();
    world.add_session("player.exe", 0.5);
    world.focus.focus("player.exe");

    let mut handler = world.handler(ControlConfigBuilder::new().build_config());
    handler.handle(Gesture::VolumeUp);
    handler.handle(Gesture::VolumeDown);

    assert_eq!(
        handler.announcer().sender().get_spoken(),
        vec!["player", "Volume 51", "Volume 50"]
    );
}

#[test]
fn test_default_bindings_cover_every_simple_gesture() {
    let bindings = default_gesture_bindings();
    assert_eq!(bindings.len(), 16);

    let mut chords: Vec<&str> = bindings.iter().map(|(chord, _)| *chord).collect();
    chords.sort_unstable();
    chords.dedup();
    assert_eq!(chords.len(), 16, "duplicate chord name");
}

/// Gesture flows that touch the focused application.
mod focus_flows {
    use super::*;

    #[test]
    fn test_silent_app_aborts_gesture_and_announces() {
        let world = TestWorld::new();
        world.focus.focus("writer.exe");

        let mut handler = world.handler(ControlConfigBuilder::new().build_config());
        handler.volume_up();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["writer.exe is not playing any sound"]
        );
        assert!(handler.state().muted().is_empty());
    }

    #[test]
    fn test_focused_session_title_is_announced_once() {
        let world = TestWorld::new();
        world.add_session("player.exe", 0.5);
        world.focus.focus("player.exe");

        let mut handler = world.handler(ControlConfigBuilder::new().build_config());
        handler.volume_up();
        handler.volume_up();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["player", "Volume 51", "Volume 52"]
        );
    }

    #[test]
    fn test_focus_change_retargets_gestures() {
        let world = TestWorld::new();
        world.add_session("player.exe", 0.5);
        world.add_session("chat.exe", 0.5);
        world.focus.focus("player.exe");

        let mut handler = world.handler(ControlConfigBuilder::new().build_config());
        handler.volume_up();

        world.focus.focus("chat.exe");
        handler.on_focus_changed();
        handler.volume_up();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["player", "Volume 51", "chat", "Volume 51"]
        );
    }

    #[test]
    fn test_focus_changes_are_ignored_when_follow_focus_is_off() {
        let world = TestWorld::new();
        world.add_session("player.exe", 0.5);
        world.add_session("chat.exe", 0.5);

        let mut handler = world.handler(
            ControlConfigBuilder::new()
                .no_follow_focus()
                .no_status()
                .build_config(),
        );
        // Pin the cursor to a session, then move focus elsewhere.
        handler.next_source();
        world.focus.focus("player.exe");
        handler.on_focus_changed();
        handler.volume_up();

        // Still targeting the navigated-to session, not the focused one
        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["chat", "Volume 51"]
        );
    }

    #[test]
    fn test_volume_down_past_zero_ends_muted() {
        let world = TestWorld::new();
        world.add_session("player.exe", 0.01);
        world.focus.focus("player.exe");

        let mut handler = world.handler(ControlConfigBuilder::new().step(5).build_config());
        handler.volume_down();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["player", "The sound is muted"]
        );
        assert!(handler.state().is_muted("player.exe"));
    }

    #[test]
    fn test_mute_toggle_round_trip() {
        let world = TestWorld::new();
        let volume = world.add_session("player.exe", 0.8);
        world.focus.focus("player.exe");

        let mut handler = world.handler(ControlConfigBuilder::new().build_config());
        handler.mute_toggle();
        assert!(handler.state().is_muted("player.exe"));
        assert!((volume.current_level() - 0.2).abs() < 0.005);

        handler.mute_toggle();
        assert!(!handler.state().is_muted("player.exe"));
        assert!((volume.current_level() - 0.8).abs() < 0.01);

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["player", "The sound is muted", "Volume 80"]
        );
    }
}

/// Cycling across the device + session sequence.
mod navigation_flows {
    use super::*;

    #[tokio::test]
    async fn test_full_cycle_visits_every_source_and_returns() {
        let world = TestWorld::new();
        world.add_device("dev-a", "Speakers", 0.5, true);
        world.add_device("dev-b", "Headphones", 0.5, false);
        world.add_session("chat.exe", 0.5);
        world.add_session("player.exe", 0.5);

        let mut handler = world.handler(
            ControlConfigBuilder::new()
                .advanced_scan()
                .no_status()
                .build_config(),
        );
        handler.rescan_devices().await.unwrap();

        for _ in 0..5 {
            handler.next_source();
        }

        let spoken = handler.announcer().sender().get_spoken();
        assert_eq!(spoken.len(), 5);
        assert_eq!(spoken[0], spoken[4]);
        assert!(spoken.contains(&"Default audio device: Speakers".to_string()));
        assert!(spoken.contains(&"Headphones".to_string()));
        assert!(spoken.contains(&"chat".to_string()));
        assert!(spoken.contains(&"player".to_string()));
    }

    #[tokio::test]
    async fn test_prev_walks_the_cycle_backwards() {
        let world = TestWorld::new();
        world.add_device("dev-a", "Speakers", 0.5, true);
        world.add_session("player.exe", 0.5);

        let mut handler = world.handler(
            ControlConfigBuilder::new()
                .advanced_scan()
                .no_status()
                .build_config(),
        );
        handler.rescan_devices().await.unwrap();

        handler.next_source();
        handler.prev_source();
        handler.prev_source();

        let spoken = handler.announcer().sender().get_spoken();
        assert_eq!(spoken.len(), 3);
        assert_eq!(spoken[0], spoken[2]);
    }

    #[test]
    fn test_empty_world_announces_not_supported() {
        let world = TestWorld::new();
        let mut handler = world.handler(ControlConfigBuilder::new().build_config());

        handler.next_source();
        handler.prev_source();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["Not supported", "Not supported"]
        );
    }

    #[test]
    fn test_selection_announces_status_when_enabled() {
        let world = TestWorld::new();
        world.add_session("player.exe", 0.5);

        let mut handler = world.handler(ControlConfigBuilder::new().build_config());
        handler.next_source();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["player", "Volume 50"]
        );
    }

    #[test]
    fn test_hidden_processes_are_skipped_in_the_cycle() {
        let world = TestWorld::new();
        world.add_session("chat.exe", 0.5);
        world.add_session("player.exe", 0.5);
        {
            let store = world.state_store();
            store.set_hidden_processes(vec!["chat.exe".to_string()]);
        }

        let mut handler = world.handler(ControlConfigBuilder::new().no_status().build_config());
        handler.next_source();
        handler.next_source();

        let spoken = handler.announcer().sender().get_spoken();
        assert!(spoken.iter().all(|s| s != "chat"));
    }

    #[test]
    fn test_duplicate_sessions_survive_with_dedupe_disabled() {
        let world = TestWorld::new();
        world.add_session("chat.exe", 0.5);
        world.add_session("chat.exe", 0.5);

        let mut handler = world.handler(
            ControlConfigBuilder::new()
                .keep_duplicates()
                .no_status()
                .build_config(),
        );
        handler.next_source();
        handler.next_source();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["chat", "chat"]
        );
    }
}

/// Channel gestures.
mod channel_flows {
    use super::*;

    #[tokio::test]
    async fn test_device_channel_cycling_and_status() {
        let world = TestWorld::new();
        let volume = MockVolume::with_channels(0.5, vec![0.3, 0.7]);
        world.devices.add_endpoint("dev-a", "Speakers", Some(volume));
        world.devices.set_default_id("dev-a");

        let mut handler = world.handler(ControlConfigBuilder::new().advanced_scan().build_config());
        handler.rescan_devices().await.unwrap();

        handler.next_source();
        handler.announcer().sender().clear();

        handler.next_channel();
        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["Channel 1", "Volume 70"]
        );
    }

    #[test]
    fn test_session_channels_announce_not_supported() {
        let world = TestWorld::new();
        world.add_session("player.exe", 0.5);
        world.focus.focus("player.exe");

        let mut handler = world.handler(ControlConfigBuilder::new().build_config());
        handler.next_channel();
        handler.channel_volume_up();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["player", "Not supported", "Not supported"]
        );
    }

    #[tokio::test]
    async fn test_channel_average_normalizes_device_channels() {
        let world = TestWorld::new();
        let volume = MockVolume::with_channels(0.5, vec![0.2, 0.6]);
        world.devices.add_endpoint("dev-a", "Speakers", Some(volume.clone()));
        world.devices.set_default_id("dev-a");

        let mut handler = world.handler(
            ControlConfigBuilder::new()
                .advanced_scan()
                .no_status()
                .build_config(),
        );
        handler.rescan_devices().await.unwrap();
        handler.next_source();

        handler.channel_volume_average();

        assert_eq!(volume.channel_levels(), vec![0.4, 0.4]);
        assert_eq!(
            handler.announcer().sender().get_spoken().last().unwrap(),
            "Volume 40"
        );
    }
}

/// Output device switching.
mod output_flows {
    use super::*;

    #[test]
    fn test_next_output_device_applies_and_announces() {
        let world = TestWorld::with_output_devices(&["", "Speakers", "Headphones"]);
        let mut handler = world.handler(ControlConfigBuilder::new().build_config());

        handler.next_output_device();

        assert_eq!(world.output.applied_devices(), vec!["Speakers"]);
        assert_eq!(world.output.tone_restart_count(), 1);
        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["Speakers"]
        );
    }

    #[test]
    fn test_direct_selection_out_of_range_is_not_supported() {
        let world = TestWorld::with_output_devices(&["", "Speakers"]);
        let mut handler = world.handler(ControlConfigBuilder::new().build_config());

        handler.switch_to_output_device(9);

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["Not supported"]
        );
        assert!(world.output.applied_devices().is_empty());
    }

    #[test]
    fn test_failed_switch_is_swallowed() {
        let world = TestWorld::with_output_devices(&["", "Speakers"]);
        world.output.set_switch_failure(true);

        let mut handler = world.handler(ControlConfigBuilder::new().build_config());
        handler.next_output_device();

        assert_eq!(
            handler.announcer().sender().get_spoken(),
            vec!["Not supported"]
        );
    }
}

/// Shutdown behavior.
mod shutdown_flows {
    use super::*;

    #[test]
    fn test_unmute_all_restores_sessions_and_clears_state() {
        let world = TestWorld::new();
        let volume = world.add_session("player.exe", 0.8);
        world.focus.focus("player.exe");

        let mut handler = world.handler(ControlConfigBuilder::new().build_config());
        handler.mute_toggle();
        assert!(handler.state().is_muted("player.exe"));

        handler.unmute_all();

        assert!(!handler.state().is_muted("player.exe"));
        assert!((volume.current_level() - 0.8).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_unmute_all_covers_devices() {
        let world = TestWorld::new();
        let volume = world.add_device("dev-a", "Speakers", 0.6, true);

        let mut handler = world.handler(
            ControlConfigBuilder::new()
                .advanced_scan()
                .no_status()
                .build_config(),
        );
        handler.rescan_devices().await.unwrap();

        handler.next_source();
        handler.mute_toggle();
        assert!(handler.state().is_muted("dev-a"));

        handler.shutdown();

        assert!(!handler.state().is_muted("dev-a"));
        assert!((volume.current_level() - 0.6).abs() < 0.01);
    }
}
