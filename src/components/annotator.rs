use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};
use crate::annotations::HarmonicSet;
use crate::canvas::colors::freq_label;
use crate::canvas::coordinates::CoordinateSystem;
use crate::canvas::overlay_renderer;
use crate::config::AnnotatorConfig;
use crate::manager::ModeManager;
use crate::modes::{ModeKind, ModeState};
use crate::state::{AppState, StateSnapshot};
use crate::types::{DataRange, ImageDimensions, KeyEvent, Modifiers, MouseButton, PointerEvent, ScreenPoint};

/// Spectrogram image with the measurement overlay on top.
#[component]
pub fn Annotator(
    range: DataRange,
    image: ImageDimensions,
    #[prop(optional, into)] image_url: Option<String>,
    #[prop(optional)] config: Option<AnnotatorConfig>,
) -> impl IntoView {
    let built = CoordinateSystem::new(range, image)
        .and_then(|cs| ModeManager::new(cs, config.unwrap_or_default()));
    let manager = match built {
        Ok(m) => m,
        Err(e) => {
            log::error!("annotator setup failed: {e}");
            return view! { <div class="annotator-error">{e.to_string()}</div> }.into_any();
        }
    };

    let snapshot: RwSignal<StateSnapshot> = RwSignal::new(manager.snapshot().clone());
    let palette_width = manager.config().palette_slider_width;
    // ModeManager holds boxed listeners, so it stays on this thread
    let manager = StoredValue::new_local(manager);
    manager.update_value(|m| {
        m.add_listener(Box::new(move |snap| match snapshot.try_set(snap.clone()) {
            None => Ok(()),
            Some(_) => Err("annotator view disposed".to_string()),
        }));
    });

    let container_ref = NodeRef::<leptos::html::Div>::new();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Redraw the overlay after every published change
    Effect::new(move || {
        let snap = snapshot.get();
        let Some(canvas_el) = canvas_ref.get() else { return };
        let canvas: &HtmlCanvasElement = canvas_el.as_ref();

        let rect = canvas.get_bounding_client_rect();
        let (w, h) = (rect.width(), rect.height());
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        if canvas.width() != w as u32 || canvas.height() != h as u32 {
            canvas.set_width(w as u32);
            canvas.set_height(h as u32);
            manager.update_value(|m| {
                if let Err(e) = m.set_container_size(w, h) {
                    log::warn!("container resize ignored: {e}");
                }
            });
        }

        let Ok(Some(obj)) = canvas.get_context("2d") else { return };
        let Ok(ctx) = obj.dyn_into::<CanvasRenderingContext2d>() else { return };
        manager.with_value(|m| overlay_renderer::draw_overlay(&ctx, &snap.state, m.transform(), w, h));
    });

    let to_pointer = move |ev: &MouseEvent| -> Option<PointerEvent> {
        let el = container_ref.get()?;
        let rect = el.get_bounding_client_rect();
        Some(PointerEvent {
            position: ScreenPoint::new(ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()),
            button: MouseButton::from_dom(ev.button()),
            modifiers: Modifiers {
                shift: ev.shift_key(),
                ctrl: ev.ctrl_key(),
                alt: ev.alt_key(),
            },
        })
    };

    let on_mousedown = move |ev: MouseEvent| {
        if let Some(p) = to_pointer(&ev) {
            manager.update_value(|m| {
                m.handle_mouse_down(&p);
            });
        }
    };

    let on_mousemove = move |ev: MouseEvent| {
        if let Some(p) = to_pointer(&ev) {
            manager.update_value(|m| {
                m.handle_mouse_move(&p);
            });
        }
    };

    let on_mouseup = move |ev: MouseEvent| {
        if let Some(p) = to_pointer(&ev) {
            manager.update_value(|m| {
                m.handle_mouse_up(&p);
            });
        }
    };

    // Leaving the widget ends any drag in progress
    let on_mouseleave = move |ev: MouseEvent| {
        if ev.buttons() == 0 {
            return;
        }
        if let Some(p) = to_pointer(&ev) {
            manager.update_value(|m| {
                m.handle_mouse_up(&p);
            });
        }
    };

    let on_contextmenu = move |ev: MouseEvent| {
        ev.prevent_default();
        if let Some(p) = to_pointer(&ev) {
            manager.update_value(|m| {
                m.handle_context_menu(&p);
            });
        }
    };

    let on_wheel = move |ev: WheelEvent| {
        ev.prevent_default();
        manager.update_value(|m| {
            m.handle_wheel(ev.delta_y());
        });
    };

    let on_keydown = move |ev: KeyboardEvent| {
        let key = KeyEvent {
            key: ev.key(),
            modifiers: Modifiers {
                shift: ev.shift_key(),
                ctrl: ev.ctrl_key(),
                alt: ev.alt_key(),
            },
        };
        let consumed = manager
            .try_update_value(|m| m.handle_key_down(&key).is_consumed())
            .unwrap_or(false);
        if consumed {
            ev.prevent_default();
        }
    };

    let image_style = move || {
        // Re-read on every snapshot so zoom and resize are both picked up
        snapshot.track();
        let transform = manager.with_value(|m| m.transform().css_transform());
        format!("transform-origin: 0 0; transform: {transform};")
    };

    let cursor = move || snapshot.with(|s| s.state.cursor.as_css());

    let mode_buttons = ModeKind::ALL
        .into_iter()
        .map(|kind| {
            let is_active = move || snapshot.with(|s| s.state.active_mode == Some(kind));
            view! {
                <button
                    class="mode-btn"
                    class:active=is_active
                    on:click=move |_| manager.update_value(|m| m.set_mode_kind(kind))
                >
                    {kind.name()}
                </button>
            }
        })
        .collect_view();

    let on_palette = move |ev: web_sys::Event| {
        if let Ok(pos) = event_target_value(&ev).parse::<f64>() {
            manager.update_value(|m| m.set_palette_position(pos));
        }
    };

    // Only re-read the sets when the snapshot reports a harmonic change
    let harmonic_sets = Memo::new(move |prev: Option<&Vec<HarmonicSet>>| {
        snapshot.with(|s| match prev {
            Some(sets) if !s.state.harmonics_changed() => sets.clone(),
            _ => s.state.harmonic_sets.clone(),
        })
    });
    let harmonic_rows = move || {
        view! {
            <For
                each=move || harmonic_sets.get()
                key=|set| (set.id, set.spacing.to_bits(), set.color.to_hex())
                let:set
            >
                <li class="harmonic-row">
                    <span class="swatch" style=format!("background: {}", set.color.to_hex())></span>
                    {freq_label(set.spacing)}
                    <button on:click=move |_| {
                        manager.update_value(|m| {
                            m.remove_harmonic_set(set.id);
                        });
                    }>"\u{00d7}"</button>
                </li>
            </For>
        }
    };

    view! {
        <div class="annotator">
            <div class="annotator-toolbar">
                {mode_buttons}
                <input
                    type="range"
                    class="palette-slider"
                    min="0"
                    max=palette_width.to_string()
                    prop:value=move || snapshot.with(|s| s.state.palette_position.to_string())
                    on:input=on_palette
                />
            </div>
            <div
                class="annotator-view"
                node_ref=container_ref
                tabindex="0"
                style:cursor=cursor
                on:mousedown=on_mousedown
                on:mousemove=on_mousemove
                on:mouseup=on_mouseup
                on:mouseleave=on_mouseleave
                on:contextmenu=on_contextmenu
                on:wheel=on_wheel
                on:keydown=on_keydown
            >
                {image_url.map(|src| view! {
                    <img class="annotator-image" src=src draggable="false" style=image_style />
                })}
                <canvas class="annotator-overlay" node_ref=canvas_ref />
            </div>
            <div class="annotator-guidance">{move || snapshot.with(|s| s.state.guidance.clone())}</div>
            <div class="annotator-status">{move || snapshot.with(|s| s.state.status.clone().unwrap_or_default())}</div>
            <div class="annotator-readout">{move || snapshot.with(|s| readout(&s.state))}</div>
            <ul class="harmonic-list">{harmonic_rows}</ul>
        </div>
    }
    .into_any()
}

/// One-line summary of the active mode's measurement.
fn readout(state: &AppState) -> String {
    let Some(kind) = state.active_mode else {
        return String::new();
    };
    match state.mode_state(kind) {
        Some(ModeState::Analysis(a)) => {
            let Some(c) = a.cursor else {
                return String::new();
            };
            let mut line = format!("{} at {:.3}", freq_label(c.freq), c.time);
            if let Some((df, dt)) = a.delta() {
                line.push_str(&format!(" (\u{0394}f {df:.1} Hz, \u{0394}t {dt:.3})"));
            }
            line
        }
        Some(ModeState::Doppler(d)) => match (d.speed, d.speed_knots()) {
            (Some(mps), Some(kn)) => format!("Speed {mps:.2} m/s ({kn:.2} kn)"),
            _ => String::new(),
        },
        _ => {
            let v = state.visible;
            format!(
                "{} - {}, {:.3} - {:.3}",
                freq_label(v.freq_low),
                freq_label(v.freq_high),
                v.time_start,
                v.time_end
            )
        }
    }
}
