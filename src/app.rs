use crate::config::SwipeConfig;
use crate::deck::Summary;
use crate::gesture::{Affordance, PointerInput, PointerSource};
use crate::images::{load_image, warm};
use crate::session::{
    choice_for_key, Action, CardPose, Effect, Phase, SessionController, SessionView, StatusLine,
};
use crate::source::{fetch_batch, fetch_cat};
use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo_timers::future::TimeoutFuture;
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: Rc<SwipeConfig>,
}

/// Feeds actions into the controller and carries out the effects it asks for.
#[derive(Clone)]
struct Driver {
    core: Rc<RefCell<SessionController>>,
    view: UseStateHandle<SessionView>,
    config: Rc<SwipeConfig>,
}

impl Driver {
    /// Returns whether the triggering event's default should be prevented.
    fn dispatch(&self, action: Action) -> bool {
        let (effects, changed) = {
            let mut core = self.core.borrow_mut();
            let before = core.view();
            let effects = core.handle(action);
            let after = core.view();
            let changed = (before != after).then_some(after);
            (effects, changed)
        };

        if let Some(snapshot) = changed {
            self.view.set(snapshot);
        }

        let mut suppress_default = false;
        for effect in effects {
            match effect {
                Effect::SuppressDefault => suppress_default = true,
                other => self.run(other),
            }
        }
        suppress_default
    }

    fn run(&self, effect: Effect) {
        match effect {
            Effect::FetchBatch { generation, count } => {
                let driver = self.clone();
                spawn_local(async move {
                    let config: &SwipeConfig = &driver.config;
                    let items = fetch_batch(count, move |_| fetch_cat(config)).await;
                    driver.dispatch(Action::BatchFetched { generation, items });
                });
            }
            Effect::Preload(items) => warm(&items),
            Effect::LoadImage {
                generation,
                cursor,
                reference,
            } => {
                let driver = self.clone();
                spawn_local(async move {
                    let loaded = match load_image(&reference).await {
                        Ok(()) => true,
                        Err(err) => {
                            warn!("{}", err);
                            false
                        }
                    };
                    driver.dispatch(Action::ImageSettled {
                        generation,
                        cursor,
                        loaded,
                    });
                });
            }
            Effect::ScheduleCommit {
                generation,
                cursor,
                delay_ms,
            } => {
                let driver = self.clone();
                spawn_local(async move {
                    TimeoutFuture::new(delay_ms).await;
                    driver.dispatch(Action::CommitElapsed { generation, cursor });
                });
            }
            Effect::SuppressDefault => {}
        }
    }

    fn pointer(&self, source: PointerSource, input: PointerInput) -> bool {
        self.dispatch(Action::Pointer { source, input })
    }
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let config = props.config.clone();
    let core = {
        let config = config.clone();
        use_mut_ref(move || SessionController::new((*config).clone()))
    };
    let view = {
        let core = core.clone();
        use_state(move || core.borrow().view())
    };
    let card_ref = use_node_ref();

    let driver = Driver {
        core,
        view: view.clone(),
        config: config.clone(),
    };

    {
        let driver = driver.clone();
        use_effect_with_deps(
            move |_| {
                driver.dispatch(Action::Start);
                || ()
            },
            (),
        );
    }

    {
        let driver = driver.clone();
        use_effect_with_deps(
            move |_| {
                let listeners = install_window_listeners(&driver);
                move || drop(listeners)
            },
            (),
        );
    }

    {
        let driver = driver.clone();
        let card_ref = card_ref.clone();
        use_effect_with_deps(
            move |phase: &Phase| {
                let listeners = match (*phase, card_ref.cast::<HtmlElement>()) {
                    (Phase::Presenting, Some(card)) => install_touch_listeners(&card, &driver),
                    _ => Vec::new(),
                };
                move || drop(listeners)
            },
            view.phase,
        );
    }

    let on_mouse_down = {
        let driver = driver.clone();
        Callback::from(move |event: MouseEvent| {
            if event.button() != 0 {
                return;
            }
            if driver.pointer(PointerSource::Mouse, PointerInput::Start(event.client_x() as f64)) {
                event.prevent_default();
            }
        })
    };

    let on_like = {
        let driver = driver.clone();
        Callback::from(move |_: MouseEvent| {
            driver.dispatch(Action::Choose { liked: true });
        })
    };

    let on_dislike = {
        let driver = driver.clone();
        Callback::from(move |_: MouseEvent| {
            driver.dispatch(Action::Choose { liked: false });
        })
    };

    let on_restart = {
        let driver = driver.clone();
        Callback::from(move |_: MouseEvent| {
            driver.dispatch(Action::Start);
        })
    };

    let content = match (view.phase, view.summary.as_ref()) {
        (Phase::Summary, Some(summary)) => render_summary(summary, on_restart),
        _ => render_swipe_view(
            &view,
            &config,
            &card_ref,
            on_mouse_down,
            on_like,
            on_dislike,
            on_restart,
        ),
    };

    html! {
        <div class="app-container">
            <header class="app-header">
                <h1>{ "Cat Swipe" }</h1>
            </header>
            <main class="content">
                { content }
            </main>
        </div>
    }
}

fn install_window_listeners(driver: &Driver) -> Vec<EventListener> {
    let mut listeners = Vec::new();
    let Some(window) = web_sys::window() else {
        return listeners;
    };
    let Some(document) = window.document() else {
        return listeners;
    };

    let key_driver = driver.clone();
    listeners.push(EventListener::new(&window, "keydown", move |event: &Event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if let Some(liked) = choice_for_key(&event.key()) {
            key_driver.dispatch(Action::Choose { liked });
        }
    }));

    let move_driver = driver.clone();
    listeners.push(EventListener::new(&document, "mousemove", move |event: &Event| {
        if let Some(event) = event.dyn_ref::<MouseEvent>() {
            move_driver.pointer(
                PointerSource::Mouse,
                PointerInput::Move(event.client_x() as f64),
            );
        }
    }));

    let up_driver = driver.clone();
    listeners.push(EventListener::new(&document, "mouseup", move |_: &Event| {
        up_driver.pointer(PointerSource::Mouse, PointerInput::End);
    }));

    if let Some(root) = document.document_element() {
        let leave_driver = driver.clone();
        listeners.push(EventListener::new(&root, "mouseleave", move |_: &Event| {
            leave_driver.pointer(PointerSource::Mouse, PointerInput::Leave);
        }));
    }

    listeners
}

fn install_touch_listeners(card: &HtmlElement, driver: &Driver) -> Vec<EventListener> {
    let active = EventListenerOptions {
        phase: EventListenerPhase::Bubble,
        passive: false,
    };
    let mut listeners = Vec::new();

    let start_driver = driver.clone();
    listeners.push(EventListener::new(card, "touchstart", move |event: &Event| {
        if let Some(x) = first_touch_x(event) {
            start_driver.pointer(PointerSource::Touch, PointerInput::Start(x));
        }
    }));

    let move_driver = driver.clone();
    listeners.push(EventListener::new_with_options(
        card,
        "touchmove",
        active,
        move |event: &Event| {
            let Some(x) = first_touch_x(event) else {
                return;
            };
            if move_driver.pointer(PointerSource::Touch, PointerInput::Move(x)) {
                event.prevent_default();
            }
        },
    ));

    let end_driver = driver.clone();
    listeners.push(EventListener::new(card, "touchend", move |_: &Event| {
        end_driver.pointer(PointerSource::Touch, PointerInput::End);
    }));

    let cancel_driver = driver.clone();
    listeners.push(EventListener::new(card, "touchcancel", move |_: &Event| {
        cancel_driver.pointer(PointerSource::Touch, PointerInput::Leave);
    }));

    listeners
}

fn first_touch_x(event: &Event) -> Option<f64> {
    let event = event.dyn_ref::<TouchEvent>()?;
    event
        .touches()
        .get(0)
        .map(|touch| touch.client_x() as f64)
}

fn render_swipe_view(
    view: &SessionView,
    config: &SwipeConfig,
    card_ref: &NodeRef,
    on_mouse_down: Callback<MouseEvent>,
    on_like: Callback<MouseEvent>,
    on_dislike: Callback<MouseEvent>,
    on_restart: Callback<MouseEvent>,
) -> Html {
    let status = html! { <p class="progress-text">{ view.status.to_string() }</p> };

    if view.status == StatusLine::FetchFailed {
        return html! {
            <section class="swipe-view active">
                { status }
                <button class="btn-restart" onclick={on_restart}>{ "Try again" }</button>
            </section>
        };
    }

    if view.phase != Phase::Presenting {
        return html! {
            <section class="swipe-view active">
                { status }
            </section>
        };
    }

    let swipe_class = match view.affordance {
        Affordance::Like => Some("swiping-like"),
        Affordance::Dislike => Some("swiping-dislike"),
        Affordance::Neutral => None,
    };

    let image = match &view.visible {
        Some(card) => html! {
            <img class="cat-image"
                src={card.reference.to_string()}
                alt={format!("Cat {}", card.position)}
                draggable="false" />
        },
        None => html! {},
    };

    html! {
        <section class="swipe-view active">
            { status }
            <div class="card-container">
                <div ref={card_ref.clone()}
                    class={classes!("card", swipe_class)}
                    style={card_style(view.pose, config)}
                    onmousedown={on_mouse_down}>
                    { image }
                    <span class="badge badge-like">{ "LIKE" }</span>
                    <span class="badge badge-dislike">{ "NOPE" }</span>
                    <div class={classes!("loading-overlay", (!view.busy).then_some("hidden"))}>
                        <div class="spinner"></div>
                    </div>
                </div>
            </div>
            <div class="actions">
                <button
                    class={classes!("btn-dislike", (view.affordance == Affordance::Dislike).then_some("btn-dislike-active"))}
                    disabled={!view.input_enabled}
                    onclick={on_dislike}>
                    { "Dislike" }
                </button>
                <button
                    class={classes!("btn-like", (view.affordance == Affordance::Like).then_some("btn-like-active"))}
                    disabled={!view.input_enabled}
                    onclick={on_like}>
                    { "Like" }
                </button>
            </div>
            <p class="hint">{ "Swipe, drag, or use ← / → to decide." }</p>
            <button class="btn-restart secondary" onclick={on_restart}>{ "New batch" }</button>
        </section>
    }
}

fn render_summary(summary: &Summary, on_restart: Callback<MouseEvent>) -> Html {
    let gallery = if summary.liked.is_empty() {
        html! { <p class="no-liked-message">{ "You didn't like any cats this time." }</p> }
    } else {
        html! {
            <div class="liked-grid">
                { for summary.liked.iter().enumerate().map(|(index, reference)| html! {
                    <img src={reference.to_string()} alt={format!("Liked cat {}", index + 1)} />
                }) }
            </div>
        }
    };

    html! {
        <section class="summary-view active">
            <h2>{ "Summary" }</h2>
            <p class="summary-count">
                { format!("You liked {} of {} cats", summary.liked_count(), summary.total) }
            </p>
            { gallery }
            <button class="btn-restart" onclick={on_restart}>{ "Start over" }</button>
        </section>
    }
}

fn card_style(pose: CardPose, config: &SwipeConfig) -> String {
    let eased = format!("transform {}ms ease-out", config.animation_ms);
    match pose {
        CardPose::Rest => "transform: translateX(0) rotate(0deg); transition: none;".to_string(),
        CardPose::Dragging {
            translate_x,
            rotate_deg,
        } => format!(
            "transform: translateX({:.1}px) rotate({:.2}deg); transition: none;",
            translate_x, rotate_deg
        ),
        CardPose::Returning => format!(
            "transform: translateX(0) rotate(0deg); transition: {};",
            eased
        ),
        CardPose::Flung { liked } => {
            let direction = if liked { 1.0 } else { -1.0 };
            format!(
                "transform: translateX({}vw) rotate({:.1}deg); transition: {};",
                direction * 100.0,
                direction * config.fling_rotation,
                eased
            )
        }
    }
}
