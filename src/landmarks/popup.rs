use crate::command::{send_on_release, CommandSender, GuideCommand};
use crate::core::config::GuideConfig;
use crate::landmarks::registry::Landmark;
use crate::rendering::Color;
use crate::ui::popup::{ContentMeasure, Popup};

pub const DIRECTIONS_LABEL: &str = "Directions";
pub const WEBSITE_LABEL: &str = "Website";
pub const TICKETS_LABEL: &str = "Tickets";
pub const CLOSE_LABEL: &str = "Close";

/// Detail popup for a landmark: title, image and description, then a button
/// per available link and a close button.
pub fn build_landmark_popup(
    landmark: &Landmark,
    config: &GuideConfig,
    measure: &dyn ContentMeasure,
    commands: &CommandSender,
) -> Popup {
    let scale = config.screen_scale();
    let mut popup = Popup::from_config(config);

    popup.add_text(
        &landmark.name,
        config.popup.title_font_size * scale,
        Color::WHITE,
        measure,
    );
    popup.add_image(&landmark.image, scale, measure);
    popup.add_text(
        &landmark.description,
        config.popup.body_font_size * scale,
        Color::WHITE,
        measure,
    );

    if let Some(address) = landmark.address() {
        popup.add_button(
            DIRECTIONS_LABEL,
            Color::WHITE,
            send_on_release(commands, GuideCommand::OpenDirections(address.to_string())),
        );
    }
    if let Some(url) = landmark.website() {
        popup.add_button(
            WEBSITE_LABEL,
            Color::WHITE,
            send_on_release(commands, GuideCommand::OpenUrl(url.to_string())),
        );
    }
    if let Some(url) = landmark.tickets() {
        popup.add_button(
            TICKETS_LABEL,
            Color::WHITE,
            send_on_release(commands, GuideCommand::OpenUrl(url.to_string())),
        );
    }
    popup.add_button(
        CLOSE_LABEL,
        Color::RED,
        send_on_release(commands, GuideCommand::ClosePopup),
    );

    popup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::command_channel;
    use crate::input::{Touch, TouchResponder};
    use crate::ui::popup::{ApproxMeasure, ContentKind};

    fn labels(popup: &Popup) -> Vec<&str> {
        popup.buttons().iter().map(|b| b.label()).collect()
    }

    #[test]
    fn test_buttons_follow_available_links() {
        let (tx, _rx) = command_channel();
        let config = GuideConfig::default();
        let measure = ApproxMeasure::new();

        let bare = Landmark::new("Pier", "pier.png", "Boats.");
        assert_eq!(labels(&build_landmark_popup(&bare, &config, &measure, &tx)), vec!["Close"]);

        let full = bare
            .with_address("Pier 17")
            .with_website("https://pier.example")
            .with_tickets("https://pier.example/tickets");
        let popup = build_landmark_popup(&full, &config, &measure, &tx);
        assert_eq!(labels(&popup), vec!["Directions", "Website", "Tickets", "Close"]);
        assert_eq!(popup.buttons()[3].color(), Color::RED);
    }

    #[test]
    fn test_content_scales_with_screen() {
        let (tx, _rx) = command_channel();
        let config = GuideConfig::for_viewport(crate::core::geo::Size::new(768.0, 1024.0));
        let landmark = Landmark::new("Pier", "pier.png", "Boats.");
        let popup = build_landmark_popup(&landmark, &config, &ApproxMeasure::new(), &tx);

        match &popup.items()[0].kind {
            ContentKind::Text { font_size, .. } => assert_eq!(*font_size, 75.0),
            other => panic!("expected title text, got {:?}", other),
        }
        assert_eq!(popup.items()[1].transform().scale, 0.5);
        match &popup.items()[2].kind {
            ContentKind::Text { font_size, .. } => assert_eq!(*font_size, 37.5),
            other => panic!("expected description text, got {:?}", other),
        }
    }

    #[test]
    fn test_buttons_send_commands() {
        let (tx, rx) = command_channel();
        let landmark = Landmark::new("Pier", "pier.png", "").with_address("Pier 17");
        let mut popup =
            build_landmark_popup(&landmark, &GuideConfig::default(), &ApproxMeasure::new(), &tx);

        for (id, button) in [(1, 0), (2, 1)] {
            let center = popup.buttons()[button].frame().center();
            popup.on_began(&Touch::new(id, center));
            popup.on_ended(&Touch::new(id, center));
        }

        assert_eq!(rx.try_recv(), Ok(GuideCommand::OpenDirections("Pier 17".into())));
        assert_eq!(rx.try_recv(), Ok(GuideCommand::ClosePopup));
        assert!(rx.try_recv().is_err());
    }
}
