use leptos::prelude::*;
use crate::components::annotator::Annotator;
use crate::types::{DataRange, ImageDimensions};

/// Demo page: a 0-24 kHz, 10 s spectrogram at 1200x600 px.
#[component]
pub fn App() -> impl IntoView {
    let dims = DataRange::new(0.0, 24_000.0, 0.0, 10.0)
        .and_then(|range| Ok((range, ImageDimensions::new(1200.0, 600.0)?)));

    view! {
        <div class="app">
            {match dims {
                Ok((range, image)) => view! {
                    <Annotator range=range image=image image_url="spectrogram.png" />
                }.into_any(),
                Err(e) => view! { <div class="empty-state">{e.to_string()}</div> }.into_any(),
            }}
        </div>
    }
}
