//! Editor for the EQ: one labelled slider row per parameter, grouped by band.

use crate::params::EqParams;
use nih_plug::prelude::{Editor, Param};
use nih_plug_vizia::vizia::prelude::*;
use nih_plug_vizia::widgets::*;
use nih_plug_vizia::{create_vizia_editor, ViziaState, ViziaTheming};
use std::sync::Arc;
#[cfg(feature = "debug")]
use std::time::Duration;

const STYLE: &str = r#"
    .main-view {
        background-color: #0f172a;
        color: #e2e8f0;
        child-space: 12px;
        row-between: 6px;
    }

    .header-title {
        font-size: 20px;
        font-weight: bold;
        color: #ffffff;
        height: 32px;
    }

    .band-title {
        font-size: 12px;
        color: #94a3b8;
        height: 20px;
        top: 6px;
    }

    .slider-row {
        height: 28px;
        col-between: 8px;
    }

    .slider-label {
        width: 110px;
        child-top: 1s;
        child-bottom: 1s;
    }
"#;

#[derive(Lens)]
struct Data {
    params: Arc<EqParams>,
}

impl Model for Data {}

pub(crate) fn default_state() -> Arc<ViziaState> {
    ViziaState::new(|| (380, 340))
}

fn slider_row<P>(
    cx: &mut Context,
    label: &'static str,
    map: impl Fn(&Arc<EqParams>) -> &P + Copy + 'static,
) where
    P: Param + 'static,
{
    HStack::new(cx, move |cx| {
        Label::new(cx, label).class("slider-label");
        ParamSlider::new(cx, Data::params, move |p| map(p)).width(Stretch(1.0));
    })
    .class("slider-row");
}

pub(crate) fn create(params: Arc<EqParams>, editor_state: Arc<ViziaState>) -> Option<Box<dyn Editor>> {
    create_vizia_editor(editor_state, ViziaTheming::default(), move |cx, _| {
        // keeps the event log moving while the transport is stopped
        #[cfg(feature = "debug")]
        {
            let timer = cx.add_timer(Duration::from_millis(250), None, |_, action| {
                if let TimerAction::Tick(_) = action {
                    crate::debug::drain();
                }
            });
            cx.start_timer(timer);
        }

        let _ = cx.add_stylesheet(STYLE);

        Data {
            params: params.clone(),
        }
        .build(cx);

        VStack::new(cx, |cx| {
            Label::new(cx, "SimpleEQ").class("header-title");

            Label::new(cx, "Low Cut").class("band-title");
            slider_row(cx, "Frequency", |p| &p.low_cut_freq);
            slider_row(cx, "Slope", |p| &p.low_cut_slope);

            Label::new(cx, "Peak").class("band-title");
            slider_row(cx, "Frequency", |p| &p.peak_freq);
            slider_row(cx, "Gain", |p| &p.peak_gain);
            slider_row(cx, "Quality", |p| &p.peak_quality);

            Label::new(cx, "High Cut").class("band-title");
            slider_row(cx, "Frequency", |p| &p.high_cut_freq);
            slider_row(cx, "Slope", |p| &p.high_cut_slope);
        })
        .class("main-view");

        ResizeHandle::new(cx);
    })
}
