//! # Click actions
//!
//! What happens when a card or row is clicked. Priority is fixed:
//! `assets.wav` > `assets.midi` > markdown asset > `url`. Every action opens in
//! a new tab.
//!
//! ```rust
//! use gallery::prelude::*;
//! let item = Item::new("song").with_assets(Assets {
//!     wav: Some("audio/song.wav".into()),
//!     md: Some("content/song.md".into()),
//!     ..Default::default()
//! });
//! let action = resolve_action(&item).expect("has action");
//! assert_eq!(action.href(), "audioplayer.html?file=audio%2Fsong.wav");
//! ```

use serde::Serialize;

use crate::items::Item;

/// Target attribute used for every action
pub const ACTION_TARGET: &str = "_blank";

/// Viewer page bundled with the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
pub enum ViewerPage {
    #[strum(serialize = "audioplayer.html")]
    AudioPlayer,
    #[strum(serialize = "midi.html")]
    Midi,
    #[strum(serialize = "article.html")]
    Article,
}

/// Navigation target for an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickAction {
    /// Open a viewer page with `?file=`
    Viewer { page: ViewerPage, file: String },
    /// Open the item's external url
    External { url: String },
}

impl ClickAction {
    /// Url to open
    pub fn href(&self) -> String {
        match self {
            Self::Viewer { page, file } => {
                format!("{page}?file={}", urlencoding::encode(file))
            }
            Self::External { url } => url.clone(),
        }
    }

    /// Window target
    pub fn target(&self) -> &'static str {
        ACTION_TARGET
    }
}

/// Resolves the click action for an item; `None` if it has nothing to open.
pub fn resolve_action(item: &Item) -> Option<ClickAction> {
    if let Some(assets) = &item.assets {
        let viewer = [
            (ViewerPage::AudioPlayer, assets.wav()),
            (ViewerPage::Midi, assets.midi()),
            (ViewerPage::Article, assets.markdown()),
        ]
        .into_iter()
        .find_map(|(page, file)| file.map(|file| (page, file)));
        if let Some((page, file)) = viewer {
            return Some(ClickAction::Viewer {
                page,
                file: file.to_string(),
            });
        }
    }
    item.url().map(|url| ClickAction::External {
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::Assets;

    fn with_assets(assets: Assets) -> Item {
        Item::new("x").with_url("https://example.com").with_assets(assets)
    }

    #[test]
    fn wav_beats_md() {
        let item = with_assets(Assets {
            wav: Some("a.wav".into()),
            md: Some("a.md".into()),
            ..Default::default()
        });
        let action = resolve_action(&item).unwrap();
        assert_eq!(
            action,
            ClickAction::Viewer {
                page: ViewerPage::AudioPlayer,
                file: "a.wav".into()
            }
        );
        assert_eq!(action.target(), "_blank");
    }

    #[test]
    fn midi_beats_md() {
        let item = with_assets(Assets {
            midi: Some("songs/a b.mid".into()),
            md: Some("a.md".into()),
            ..Default::default()
        });
        assert_eq!(
            resolve_action(&item).unwrap().href(),
            "midi.html?file=songs%2Fa%20b.mid"
        );
    }

    #[test]
    fn md_opens_article() {
        let item = with_assets(Assets {
            md: Some("content/post.md".into()),
            ..Default::default()
        });
        assert_eq!(
            resolve_action(&item).unwrap().href(),
            "article.html?file=content%2Fpost.md"
        );
    }

    #[test]
    fn content_path_opens_article() {
        let item = with_assets(Assets {
            content: Some("/content/post.md".into()),
            ..Default::default()
        });
        assert_eq!(
            resolve_action(&item).unwrap().href(),
            "article.html?file=%2Fcontent%2Fpost.md"
        );
    }

    #[test]
    fn url_when_no_viewer_asset() {
        let item = with_assets(Assets {
            image: Some("i.png".into()),
            ..Default::default()
        });
        assert_eq!(
            resolve_action(&item),
            Some(ClickAction::External {
                url: "https://example.com".into()
            })
        );
    }

    #[test]
    fn nothing_to_open() {
        assert_eq!(resolve_action(&Item::new("bare")), None);
    }
}
