//! Browser bindings: web-sys implementations of the ports and the entry point
//! called from `static/index.html`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{error, info, warn, Level};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, FormData, HtmlElement, HtmlFormElement, Url, Window};

use crate::config::ClockConfig;
use crate::controller::ClockController;
use crate::error::ClockError;
use crate::models::{ElementId, Side};
use crate::ports::{History, Page, Scheduler, TimerHandle, OUT_OF_TIME_PARAM};

/// Name of the start form field holding the budget in minutes
const TIME_FIELD: &str = "time";

type WebController = ClockController<DomPage, BrowserHistory, IntervalScheduler>;

fn js_err(value: JsValue) -> ClockError {
    ClockError::Js(format!("{:?}", value))
}

impl From<ClockError> for JsValue {
    fn from(err: ClockError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

fn element(document: &Document, id: ElementId) -> Result<Element, ClockError> {
    document
        .get_element_by_id(id.as_str())
        .ok_or(ClockError::MissingElement(id.as_str()))
}

fn html_element(document: &Document, id: ElementId) -> Result<HtmlElement, ClockError> {
    element(document, id)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| ClockError::MissingElement(id.as_str()))
}

/// The clock's elements, looked up once at startup
pub struct DomPage {
    document: Document,
    wrapper: HtmlElement,
    white: Element,
    black: Element,
    white_time: Element,
    black_time: Element,
}

impl DomPage {
    pub fn from_document(document: Document) -> Result<Self, ClockError> {
        Ok(DomPage {
            wrapper: html_element(&document, ElementId::StartWrapper)?,
            white: element(&document, ElementId::button(Side::White))?,
            black: element(&document, ElementId::button(Side::Black))?,
            white_time: element(&document, ElementId::display(Side::White))?,
            black_time: element(&document, ElementId::display(Side::Black))?,
            document,
        })
    }

    fn button(&self, side: Side) -> &Element {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    fn display(&self, side: Side) -> &Element {
        match side {
            Side::White => &self.white_time,
            Side::Black => &self.black_time,
        }
    }
}

impl Page for DomPage {
    fn set_indicator(&mut self, side: Side, active: bool) -> Result<(), ClockError> {
        let button = self.button(side);
        if active {
            button.remove_attribute("disabled").map_err(js_err)?;
            button.class_list().add_1("active").map_err(js_err)
        } else {
            button.set_attribute("disabled", "true").map_err(js_err)?;
            button.class_list().remove_1("active").map_err(js_err)
        }
    }

    fn set_display_text(&mut self, side: Side, text: &str) -> Result<(), ClockError> {
        self.display(side).set_text_content(Some(text));
        Ok(())
    }

    fn set_start_form_visible(&mut self, visible: bool) -> Result<(), ClockError> {
        let display = if visible { "flex" } else { "none" };
        self.wrapper
            .style()
            .set_property("display", display)
            .map_err(js_err)
    }

    fn show_result(&mut self, message: &str) -> Result<(), ClockError> {
        self.clear_result()?;
        let p = self.document.create_element("p").map_err(js_err)?;
        p.set_id(ElementId::Result.as_str());
        p.set_text_content(Some(message));
        self.wrapper.prepend_with_node_1(&p).map_err(js_err)
    }

    fn clear_result(&mut self) -> Result<(), ClockError> {
        if let Some(result) = self.document.get_element_by_id(ElementId::Result.as_str()) {
            result.remove();
        }
        Ok(())
    }
}

/// The `out_of_time` query parameter of the current address
pub struct BrowserHistory {
    window: Window,
}

impl BrowserHistory {
    pub fn new(window: Window) -> Self {
        BrowserHistory { window }
    }

    fn current_url(&self) -> Result<Url, ClockError> {
        let href = self.window.location().href().map_err(js_err)?;
        Url::new(&href).map_err(js_err)
    }

    fn push(&self, url: &Url) -> Result<(), ClockError> {
        self.window
            .history()
            .map_err(js_err)?
            .push_state_with_url(&JsValue::NULL, "", Some(&url.href()))
            .map_err(js_err)
    }
}

impl History for BrowserHistory {
    fn out_of_time(&self) -> Result<Option<String>, ClockError> {
        Ok(self.current_url()?.search_params().get(OUT_OF_TIME_PARAM))
    }

    fn set_out_of_time(&mut self, side: Side) -> Result<(), ClockError> {
        let url = self.current_url()?;
        url.search_params().set(OUT_OF_TIME_PARAM, side.name());
        self.push(&url)
    }

    fn clear_out_of_time(&mut self) -> Result<(), ClockError> {
        let url = self.current_url()?;
        url.search_params().delete(OUT_OF_TIME_PARAM);
        self.push(&url)
    }
}

/// `setInterval`/`clearInterval` around a single tick callback
pub struct IntervalScheduler {
    window: Window,
    callback: Closure<dyn FnMut()>,
}

impl IntervalScheduler {
    /// The callback ticks the controller for as long as it is alive.
    fn new(window: Window, controller: Weak<RefCell<WebController>>) -> Self {
        let callback = Closure::wrap(Box::new(move || {
            let Some(controller) = controller.upgrade() else {
                return;
            };
            if let Err(e) = controller.borrow_mut().tick() {
                error!("Tick failed: {}", e);
            }
        }) as Box<dyn FnMut()>);
        IntervalScheduler { window, callback }
    }
}

impl Scheduler for IntervalScheduler {
    fn start_interval(&mut self, interval_ms: u32) -> Result<TimerHandle, ClockError> {
        let timeout = i32::try_from(interval_ms).map_err(|e| ClockError::Js(e.to_string()))?;
        self.window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                self.callback.as_ref().unchecked_ref::<js_sys::Function>(),
                timeout,
            )
            .map(TimerHandle)
            .map_err(js_err)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.window.clear_interval_with_handle(handle.0);
    }
}

/// A mounted clock, returned to JavaScript
#[wasm_bindgen]
pub struct ClockHandle {
    controller: Rc<RefCell<WebController>>,
}

#[wasm_bindgen]
impl ClockHandle {
    /// The controller state as JSON, for debugging from the console.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        Ok(self.controller.borrow().snapshot()?)
    }

    pub fn cancel(&self) -> Result<(), JsValue> {
        Ok(self.controller.borrow_mut().cancel_game()?)
    }
}

/// Wires the clock into the current page.
///
/// Fails if the page is missing any element the clock drives.
#[wasm_bindgen]
pub fn mount() -> Result<ClockHandle, JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(Level::Debug).is_err() {
        warn!("Logger already initialised");
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let page = DomPage::from_document(document.clone())?;
    let history = BrowserHistory::new(window.clone());
    let controller = Rc::new_cyclic(|weak: &Weak<RefCell<WebController>>| {
        let scheduler = IntervalScheduler::new(window.clone(), weak.clone());
        RefCell::new(ClockController::new(
            page,
            history,
            scheduler,
            ClockConfig::default(),
        ))
    });

    bind_controls(&document, &controller)?;
    controller.borrow_mut().on_page_loaded()?;
    info!("Chess clock mounted");

    Ok(ClockHandle { controller })
}

fn on_click(
    document: &Document,
    id: ElementId,
    controller: &Rc<RefCell<WebController>>,
    action: fn(&mut WebController) -> Result<(), ClockError>,
) -> Result<(), ClockError> {
    let target = element(document, id)?;
    let controller = Rc::clone(controller);
    let cb = Closure::wrap(Box::new(move |_event: Event| {
        if let Err(e) = action(&mut controller.borrow_mut()) {
            error!("Handling click on {} failed: {}", id.as_str(), e);
        }
    }) as Box<dyn FnMut(_)>);
    target
        .add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
        .map_err(js_err)?;
    cb.forget();
    Ok(())
}

fn bind_controls(
    document: &Document,
    controller: &Rc<RefCell<WebController>>,
) -> Result<(), ClockError> {
    on_click(document, ElementId::button(Side::White), controller, |c| {
        c.on_side_clicked(Side::White)
    })?;
    on_click(document, ElementId::button(Side::Black), controller, |c| {
        c.on_side_clicked(Side::Black)
    })?;
    on_click(document, ElementId::BackButton, controller, |c| c.cancel_game())?;

    let form = element(document, ElementId::StartForm)?
        .dyn_into::<HtmlFormElement>()
        .map_err(|_| ClockError::MissingElement(ElementId::StartForm.as_str()))?;
    let submit_form = form.clone();
    let submit_state = Rc::clone(controller);
    let submit_cb = Closure::wrap(Box::new(move |event: Event| {
        event.prevent_default();
        let raw = FormData::new_with_form(&submit_form)
            .ok()
            .and_then(|data| data.get(TIME_FIELD).as_string())
            .unwrap_or_default();
        match submit_state.borrow_mut().start_game_from_input(&raw) {
            // Already logged by the controller; the form stays up.
            Ok(()) | Err(ClockError::InvalidBudget(_)) => {}
            Err(e) => error!("Starting the game failed: {}", e),
        }
    }) as Box<dyn FnMut(_)>);
    form.add_event_listener_with_callback("submit", submit_cb.as_ref().unchecked_ref())
        .map_err(js_err)?;
    submit_cb.forget();

    Ok(())
}
