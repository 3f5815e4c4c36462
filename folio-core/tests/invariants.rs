//! Property tests over random command sequences

use folio_core::{Command, LayoutMode, Spread, Viewer, ViewerConfig, ViewerEvent};
use proptest::prelude::*;

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Previous),
        Just(Command::Next),
        Just(Command::First),
        Just(Command::Last),
        (-3i64..40).prop_map(Command::GoTo),
        Just(Command::ZoomIn),
        Just(Command::ZoomOut),
        Just(Command::ZoomReset),
        Just(Command::ToggleDoublePage),
        Just(Command::ToggleCoverPage),
        Just(Command::ToggleContinuous),
    ]
}

proptest! {
    #[test]
    fn current_index_stays_in_range(
        page_count in 1usize..40,
        commands in prop::collection::vec(command(), 0..60),
    ) {
        let config = ViewerConfig::default();
        let mut viewer = Viewer::new(config.clone());
        viewer.open_document(page_count, None);

        for command in commands {
            viewer.dispatch(command);
            let state = viewer.state().unwrap();

            prop_assert!(state.current_page_index() < page_count);
            prop_assert!(state.zoom() >= config.zoom.min && state.zoom() <= config.zoom.max);
            prop_assert!(!(state.is_continuous_mode() && state.is_double_page_mode()));

            let spread = state.spread();
            prop_assert!(spread.pages().all(|page| page < page_count));
            if state.layout() == (LayoutMode::Double { cover: false }) {
                prop_assert_eq!(spread.left.map(|left| left % 2), Some(0));
            }
            if state.is_cover_page_mode() && state.current_page_index() == 0 && page_count > 1 {
                prop_assert_eq!(spread, Spread::cover(0));
            }
            if state.is_continuous_mode() {
                prop_assert_eq!(state.zoom(), config.zoom.continuous);
            }
        }
    }

    #[test]
    fn render_generations_increase(
        page_count in 1usize..20,
        commands in prop::collection::vec(command(), 0..40),
    ) {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let mut last_generation = 0;
        let opened = viewer.open_document(page_count, None);

        let dispatched = commands.into_iter().map(|c| viewer.dispatch(c));
        for events in std::iter::once(opened).chain(dispatched) {
            for event in events {
                if let ViewerEvent::Render(request) = event {
                    prop_assert!(request.generation > last_generation);
                    last_generation = request.generation;
                }
            }
        }
    }

    #[test]
    fn rejected_commands_leave_state_unchanged(
        page_count in 1usize..20,
        requested in prop_oneof![-50i64..1, 21i64..80],
    ) {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.open_document(page_count, None);
        viewer.dispatch(Command::Next);
        let before = viewer.state().unwrap().clone();

        let events = viewer.dispatch(Command::GoTo(requested));
        prop_assert!(matches!(events.as_slice(), [ViewerEvent::Status(_)]));
        prop_assert_eq!(viewer.state().unwrap(), &before);
    }
}
