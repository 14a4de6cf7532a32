//! Managed thread for an IO runtime. Concrete implementation depends on the target.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) use native::*;

#[cfg(target_arch = "wasm32")]
pub(crate) use web::*;

#[cfg(target_arch = "wasm32")]
mod web {
    /// Futures run on the browser's event loop, so there is nothing to manage.
    pub struct Runtime;

    impl Runtime {
        pub fn new<F>(f: F) -> Self
        where
            F: std::future::Future<Output = ()> + 'static,
        {
            wasm_bindgen_futures::spawn_local(f);
            Self
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    /// Single-threaded Tokio runtime on its own thread, shut down when dropped.
    pub struct Runtime {
        join_handle: Option<std::thread::JoinHandle<()>>,
        quit_tx: tokio::sync::mpsc::UnboundedSender<()>,
    }

    impl Runtime {
        pub fn new<F>(f: F) -> Self
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            let (quit_tx, mut quit_rx) = tokio::sync::mpsc::unbounded_channel();

            let join_handle = std::thread::Builder::new()
                .name("worldtopo-io".to_owned())
                .spawn(move || {
                    let runtime = match tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                    {
                        Ok(runtime) => runtime,
                        Err(err) => {
                            log::error!("Could not create the Tokio runtime, tokens will not be issued: {err}.");
                            return;
                        }
                    };

                    runtime.spawn(f);
                    runtime.block_on(quit_rx.recv());
                });

            let join_handle = match join_handle {
                Ok(join_handle) => Some(join_handle),
                Err(err) => {
                    log::error!("Could not spawn the IO thread: {err}.");
                    None
                }
            };

            Self {
                join_handle,
                quit_tx,
            }
        }
    }

    impl Drop for Runtime {
        fn drop(&mut self) {
            // Tokio thread might be dead, nothing to do in this case.
            let _ = self.quit_tx.send(());

            if let Some(join_handle) = self.join_handle.take() {
                log::debug!("Waiting for the IO thread to exit.");
                // Again, Tokio thread might be already dead, nothing to do in this case.
                let _ = join_handle.join();
            }

            log::debug!("IO thread is down.");
        }
    }
}
