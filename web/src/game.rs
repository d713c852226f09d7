use crate::audio::WebAudio;
use crate::utils::*;
use clap::Args;
use core::time::Duration;
use gloo::timers::callback::Timeout;
use memtiles_core as game;
use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::prelude::*;

type Session = game::Game<(), WebAudio, WebScheduler>;

impl StorageKey for game::SetupForm {
    const KEY: &'static str = "memtiles:setup:v1";
}

/// Hands due timers back to the view, tagged with the session that asked for them.
#[derive(Debug)]
pub(crate) struct WebScheduler {
    link: Scope<GameView>,
    session_id: u32,
}

impl game::Scheduler for WebScheduler {
    fn schedule(&mut self, delay: Duration, timer: game::Timer) {
        let link = self.link.clone();
        let session_id = self.session_id;
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || link.send_message(Msg::Timer(session_id, timer))).forget();
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Field {
    Name,
    Rows,
    Columns,
    Lives,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Edit(Field, String),
    Start,
    Click(game::Tile),
    Timer(u32, game::Timer),
    PlayAgain,
    Quit,
}

fn status_for(event: &game::GameEvent) -> Option<&'static str> {
    use game::GameEvent::*;
    match event {
        LevelStarted { .. } => Some("Watch the sequence!"),
        SequenceFinished => Some("Repeat the sequence!"),
        ClickResult {
            correct: false,
            lives_remaining: 0,
            ..
        } => Some("Game Over"),
        ClickResult { correct: false, .. } => Some("Wrong tile! Try again."),
        ClickResult { correct: true, .. } => None,
        LevelCompleted { .. } => Some("Correct! Moving to next level..."),
        GameOver { .. } => Some("Game Over"),
        Quit => Some(""),
    }
}

const fn tile_color(state: game::VisualState) -> &'static str {
    use game::VisualState::*;
    match state {
        Default => "lightgray",
        Flashed(color) => color.css_name(),
        Error => "red",
    }
}

#[derive(Properties, Clone, PartialEq)]
struct TileProps {
    tile: game::Tile,
    state: game::VisualState,
    #[prop_or_default]
    locked: bool,
    callback: Callback<game::Tile>,
}

#[function_component(TileView)]
fn tile_component(props: &TileProps) -> Html {
    let TileProps {
        tile,
        state,
        locked,
        callback,
    } = props.clone();

    let style = format!("background-color: {}", tile_color(state));
    let class = classes!("tile", locked.then_some("locked"));
    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("{} clicked", tile);
        callback.emit(tile);
    });

    html! {
        <td><button {class} {style} {onclick} disabled={locked}/></td>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,
}

pub(crate) struct GameView {
    form: game::SetupForm,
    notices: Vec<game::SetupNotice>,
    session: Option<Session>,
    session_id: u32,
    status: &'static str,
}

impl GameView {
    fn start_session(&mut self, ctx: &Context<Self>) {
        let game::Setup { config, notices } = self.form.parse();
        for notice in &notices {
            log::info!("setup: {}", notice);
        }
        self.notices = notices;
        self.form.local_save();

        let seed = ctx.props().seed.unwrap_or_else(js_random_seed);
        self.session_id = self.session_id.wrapping_add(1);
        let scheduler = WebScheduler {
            link: ctx.link().clone(),
            session_id: self.session_id,
        };

        let started = game::Game::new(config.with_seed(seed), (), WebAudio::default(), scheduler)
            .and_then(|mut session| {
                session.start()?;
                Ok(session)
            });
        match started {
            Ok(session) => self.session = Some(session),
            Err(err) => {
                log::error!("could not start a game: {}", err);
                self.session = None;
            }
        }
    }

    /// Applies `action` to the running session, then reflects its events in the status line.
    fn with_session<T>(
        &mut self,
        action: impl FnOnce(&mut Session) -> game::Result<T>,
    ) -> Option<T> {
        let session = self.session.as_mut()?;
        let result = match action(session) {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("{}", err);
                None
            }
        };
        for event in session.take_events() {
            log::debug!("event: {:?}", event);
            if let Some(status) = status_for(&event) {
                self.status = status;
            }
        }
        result
    }

    fn is_in_game(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.phase() != game::Phase::Quit)
    }

    fn view_setup(&self, ctx: &Context<Self>) -> Html {
        let input = |field: Field| {
            ctx.link().callback(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                Msg::Edit(field, input.value())
            })
        };
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Start
        });

        html! {
            <form class="setup" {onsubmit}>
                <label>{"Name"}<input value={self.form.name.clone()} oninput={input(Field::Name)}/></label>
                <label>{"Rows"}<input value={self.form.rows.clone()} oninput={input(Field::Rows)}/></label>
                <label>{"Columns"}<input value={self.form.columns.clone()} oninput={input(Field::Columns)}/></label>
                <label>{"Lives"}<input value={self.form.lives.clone()} oninput={input(Field::Lives)}/></label>
                <button type="submit">{"Start"}</button>
            </form>
        }
    }

    fn view_session(&self, ctx: &Context<Self>, session: &Session) -> Html {
        let board = session.board();
        let (rows, cols) = board.size();
        let locked = !session.accepts_input();
        let callback = ctx.link().callback(Msg::Click);
        let game_over = session.phase() == game::Phase::GameOver;

        html! {
            <>
                <nav>
                    <aside>{format!("Player: {}", session.tracker().player_name())}</aside>
                    <aside>{format!("Score: {}", session.score())}</aside>
                    <aside>{format!("Lives: {}", session.lives_remaining())}</aside>
                </nav>
                <p class="status">{self.status}</p>
                <table class={(!locked).then_some("playable")}>
                    {
                        for (0..rows).map(|row| html! {
                            <tr>
                                {
                                    for (0..cols).filter_map(|col| board.tile_at(row, col)).map(|tile| {
                                        let state = board.visual_at(tile).unwrap_or_default();
                                        let callback = callback.clone();
                                        html! {
                                            <TileView {tile} {state} {locked} {callback}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
                <dialog open={game_over}>
                    <article>
                        <h2>{"Game Over"}</h2>
                        <p>{format!("{}, your score: {}", session.tracker().player_name(), session.score())}</p>
                        <footer>
                            <button onclick={ctx.link().callback(|_| Msg::PlayAgain)}>{"Play Again"}</button>
                            <button onclick={ctx.link().callback(|_| Msg::Quit)}>{"Quit"}</button>
                        </footer>
                    </article>
                </dialog>
            </>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            form: LocalOrDefault::local_or_default(),
            notices: Vec::new(),
            session: None,
            session_id: 0,
            status: "",
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Edit(field, value) => {
                let slot = match field {
                    Field::Name => &mut self.form.name,
                    Field::Rows => &mut self.form.rows,
                    Field::Columns => &mut self.form.columns,
                    Field::Lives => &mut self.form.lives,
                };
                *slot = value;
                false
            }
            Start => {
                self.start_session(ctx);
                true
            }
            Click(tile) => self
                .with_session(|session| session.click(tile))
                .flatten()
                .is_some(),
            Timer(session_id, timer) if session_id == self.session_id => {
                log::trace!("timer: {:?}", timer);
                self.with_session(|session| session.fire(timer)).is_some()
            }
            Timer(session_id, timer) => {
                log::trace!("dropping {:?} of session {}", timer, session_id);
                false
            }
            PlayAgain => self.with_session(|session| session.replay()).is_some(),
            Quit => self.with_session(|session| session.quit()).is_some(),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="memtiles">
                {
                    match self.session.as_ref().filter(|_| self.is_in_game()) {
                        Some(session) => self.view_session(ctx, session),
                        None => self.view_setup(ctx),
                    }
                }
                <ul class="notices">
                    { for self.notices.iter().map(|notice| html! { <li>{notice.to_string()}</li> }) }
                </ul>
            </div>
        }
    }
}
