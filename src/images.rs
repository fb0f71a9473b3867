use crate::source::ImageRef;
use futures::channel::oneshot;
use gloo_events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use web_sys::HtmlImageElement;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("could not create an image element")]
    Unavailable,
    #[error("image failed to load: {0}")]
    Failed(String),
}

/// Best-effort cache warm-up; returns immediately.
pub fn warm(references: &[ImageRef]) {
    for reference in references {
        if let Ok(image) = HtmlImageElement::new() {
            image.set_src(reference.as_str());
        }
    }
}

/// Resolves once the browser reports the image as loaded or broken.
pub async fn load_image(reference: &ImageRef) -> Result<(), ImageLoadError> {
    let image = HtmlImageElement::new().map_err(|_| ImageLoadError::Unavailable)?;
    let (sender, receiver) = oneshot::channel::<bool>();
    let sender = Rc::new(RefCell::new(Some(sender)));

    let settle = |outcome: bool| {
        let sender = sender.clone();
        move |_: &web_sys::Event| {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(outcome);
            }
        }
    };
    let on_load = EventListener::once(&image, "load", settle(true));
    let on_error = EventListener::once(&image, "error", settle(false));

    image.set_src(reference.as_str());
    let loaded = receiver.await.unwrap_or(false);
    drop((on_load, on_error));

    if loaded {
        Ok(())
    } else {
        Err(ImageLoadError::Failed(reference.to_string()))
    }
}
