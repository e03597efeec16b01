use std::path::PathBuf;

use face_insight_core::video::domain::source_kind::SourceKind;

#[derive(Debug, PartialEq)]
pub enum MenuAction {
    Run(SourceKind),
    Quit,
}

/// Asks the operator a follow-up question; `None` once input is closed.
pub type Prompt<'a> = dyn FnMut(&str) -> Option<String> + 'a;

pub struct MenuCommand {
    pub key: &'static str,
    pub description: &'static str,
    handler: fn(&mut Prompt<'_>) -> Option<MenuAction>,
}

pub const COMMANDS: &[MenuCommand] = &[
    MenuCommand {
        key: "c",
        description: "Live analysis from camera 0",
        handler: camera,
    },
    MenuCommand {
        key: "v",
        description: "Analyze a video file",
        handler: video,
    },
    MenuCommand {
        key: "q",
        description: "Quit",
        handler: quit,
    },
];

pub fn render() -> String {
    let mut text = String::from("\n--- Face Insight ---\n");
    for command in COMMANDS {
        text.push_str(&format!(
            "{}: {}\n",
            command.key.to_uppercase(),
            command.description
        ));
    }
    text
}

/// Looks `choice` up in [`COMMANDS`] and runs its handler.
///
/// Returns `None` for an unknown key or an abandoned prompt.
pub fn dispatch(choice: &str, prompt: &mut Prompt<'_>) -> Option<MenuAction> {
    let choice = choice.trim().to_lowercase();
    COMMANDS
        .iter()
        .find(|command| command.key == choice)
        .and_then(|command| (command.handler)(prompt))
}

fn camera(_prompt: &mut Prompt<'_>) -> Option<MenuAction> {
    Some(MenuAction::Run(SourceKind::Camera(0)))
}

fn video(prompt: &mut Prompt<'_>) -> Option<MenuAction> {
    let answer = prompt("Video file path: ")?;
    let path = answer.trim();
    if path.is_empty() {
        return None;
    }
    Some(MenuAction::Run(SourceKind::File(PathBuf::from(path))))
}

fn quit(_prompt: &mut Prompt<'_>) -> Option<MenuAction> {
    Some(MenuAction::Quit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn no_prompt(_: &str) -> Option<String> {
        panic!("unexpected prompt")
    }

    #[rstest]
    #[case::camera("c", MenuAction::Run(SourceKind::Camera(0)))]
    #[case::upper_camera("C\n", MenuAction::Run(SourceKind::Camera(0)))]
    #[case::quit(" q ", MenuAction::Quit)]
    fn test_dispatch_without_prompt(#[case] choice: &str, #[case] expected: MenuAction) {
        assert_eq!(dispatch(choice, &mut no_prompt), Some(expected));
    }

    #[test]
    fn test_video_prompts_for_path() {
        let mut asked = Vec::new();
        let mut prompt = |question: &str| {
            asked.push(question.to_string());
            Some("  clips/street.mp4\n".to_string())
        };
        let action = dispatch("v", &mut prompt);
        assert_eq!(
            action,
            Some(MenuAction::Run(SourceKind::File(PathBuf::from(
                "clips/street.mp4"
            ))))
        );
        assert_eq!(asked, vec!["Video file path: "]);
    }

    #[rstest]
    #[case::closed_input(None)]
    #[case::blank_path(Some("   ".to_string()))]
    fn test_video_without_path_is_abandoned(#[case] answer: Option<String>) {
        let mut prompt = |_: &str| answer.clone();
        assert_eq!(dispatch("v", &mut prompt), None);
    }

    #[rstest]
    #[case("x")]
    #[case("")]
    #[case("camera")]
    fn test_unknown_choice(#[case] choice: &str) {
        assert_eq!(dispatch(choice, &mut no_prompt), None);
    }

    #[test]
    fn test_render_lists_every_command() {
        let text = render();
        for command in COMMANDS {
            assert!(text.contains(command.description));
        }
        assert!(text.contains("V: Analyze a video file"));
    }
}
