use gloo::events::EventListener;
use memtiles_core::{AudioError, AudioOutput, Cue};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlAudioElement;

/// Where the cue recordings are served from, relative to the page.
pub(crate) const SOUNDS_DIR: &str = "sounds";

/// Shared flag raised once the browser gives up on a clip.
#[derive(Clone, Debug, Default)]
struct ClipHealth(Rc<Cell<bool>>);

impl ClipHealth {
    fn mark_failed(&self) {
        self.0.set(true);
    }

    fn is_playable(&self) -> bool {
        !self.0.get()
    }
}

/// One `<audio>` element, skipped for good after it fails to load.
#[derive(Debug)]
pub(crate) struct WebClip {
    cue: Cue,
    element: HtmlAudioElement,
    health: ClipHealth,
    _on_error: EventListener,
}

/// Plays cues through one `<audio>` element per clip.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WebAudio {
    base: String,
}

impl WebAudio {
    pub(crate) fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn source_of(&self, cue: Cue) -> String {
        format!("{}/{}.wav", self.base, cue.file_stem())
    }
}

impl Default for WebAudio {
    fn default() -> Self {
        Self::new(SOUNDS_DIR)
    }
}

impl AudioOutput for WebAudio {
    type Clip = WebClip;

    fn load(&mut self, cue: Cue) -> Result<WebClip, AudioError> {
        let src = self.source_of(cue);
        let element = HtmlAudioElement::new_with_src(&src).map_err(|err| AudioError::Load {
            cue,
            reason: format!("{:?}", err),
        })?;
        log::trace!("loading {} from {}", cue, src);

        // a missing file only shows up here, after the element was created
        let health = ClipHealth::default();
        let on_error = {
            let health = health.clone();
            EventListener::new(&element, "error", move |_| {
                log::warn!("could not load {} from {}, playing it silently", cue, src);
                health.mark_failed();
            })
        };
        element.set_preload("auto");

        Ok(WebClip {
            cue,
            element,
            health,
            _on_error: on_error,
        })
    }

    fn play(&mut self, clip: &WebClip) {
        if !clip.health.is_playable() {
            log::trace!("skipping {}", clip.cue);
            return;
        }

        // restart when the previous play of the same clip is still running
        clip.element.set_current_time(0.0);
        let cue = clip.cue;
        match clip.element.play() {
            Ok(promise) => spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    log::warn!("could not play {}: {:?}", cue, err);
                }
            }),
            Err(err) => log::warn!("could not play {}: {:?}", cue, err),
        }
    }
}
