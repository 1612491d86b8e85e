// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{sync::Arc, time::Duration};

use crate::{CursorBlinker, ElementRef, QueueProcessor, StdMutex, Task, TextElement,
            TimerRegistry, TypewriterOptions, TypewriterState, lock_or_recover};

/// The public, chainable control surface.
///
/// - [`Self::write()`], [`Self::delete()`] and [`Self::stop()`] only enqueue. They
///   return `&Self` so calls can be chained.
/// - [`Self::start()`] drains the queue in the background. Calling it again while
///   draining does nothing.
/// - [`Self::reset()`] synchronously empties the queue and the text.
/// - [`Self::attach()`] and [`Self::detach()`] manage the lifecycle. Dropping a
///   `Typewriter` detaches it.
///
/// [`Self::start()`] and [`Self::attach()`] spawn Tokio tasks, so they must be called
/// from inside a Tokio runtime.
#[allow(missing_debug_implementations)]
pub struct Typewriter {
    processor: QueueProcessor,
    maybe_cursor_blinker: StdMutex<Option<CursorBlinker>>,
}

impl Typewriter {
    /// Create a typewriter with no element attached. Nothing is drained until
    /// [`Self::attach()`] or [`Self::start()`] is called.
    #[must_use]
    pub fn new(options: TypewriterOptions) -> Self {
        Self {
            processor: QueueProcessor {
                options: Arc::new(options),
                state: Arc::new(StdMutex::new(TypewriterState::default())),
                element: ElementRef::default(),
                timers: TimerRegistry::new(),
            },
            maybe_cursor_blinker: StdMutex::new(None),
        }
    }

    #[must_use]
    pub fn options(&self) -> &TypewriterOptions { &self.processor.options }

    #[must_use]
    pub fn element(&self) -> &ElementRef { &self.processor.element }

    #[must_use]
    pub fn timers(&self) -> &TimerRegistry { &self.processor.timers }

    /// Attach `element`: clear the text, start the cursor blinker (if enabled), and
    /// begin draining whatever is already queued.
    pub fn attach(&self, element: impl TextElement + 'static) {
        self.processor.element.attach(Box::new(element));

        {
            let mut state = lock_or_recover(&self.processor.state);
            state.buffer.clear();
            if let Err(report) = self.processor.element.paint("") {
                tracing::warn!(message = "failed to clear element on attach", %report);
            }
        }

        let options = &self.processor.options;
        if options.cursor {
            let mut maybe_cursor_blinker = lock_or_recover(&self.maybe_cursor_blinker);
            if maybe_cursor_blinker.is_none() {
                *maybe_cursor_blinker = Some(CursorBlinker::start(
                    options.cursor_speed,
                    options.cursor_char.clone(),
                    self.processor.state.clone(),
                    self.processor.element.clone(),
                ));
            }
        }

        tracing::debug!(message = "element attached");
        self.start();
    }

    /// Tear down: reset, cancel every pending timer, stop the cursor blinker, and hand
    /// back the element (if one was attached).
    pub fn detach(&self) -> Option<Box<dyn TextElement>> {
        self.reset();
        self.processor.timers.cancel_all();

        let maybe_cursor_blinker = lock_or_recover(&self.maybe_cursor_blinker).take();
        if let Some(cursor_blinker) = maybe_cursor_blinker {
            cursor_blinker.request_shutdown();
        }

        let maybe_element = self.processor.element.detach();
        if maybe_element.is_some() {
            tracing::debug!(message = "element detached");
        }
        maybe_element
    }

    /// Queue typing `text`, one grapheme cluster per `speed`. ANSI escape sequences are
    /// stripped first, since they can't be typed one character at a time.
    pub fn write(&self, text: impl AsRef<str>) -> &Self {
        let text = text.as_ref();
        let text = if text.contains('\u{1b}') {
            strip_ansi_escapes::strip_str(text)
        } else {
            text.to_string()
        };
        self.enqueue(Task::Write(text))
    }

    /// Queue deleting `count` grapheme clusters from the end, one per `speed`. Deleting
    /// past the start of the text leaves it empty.
    pub fn delete(&self, count: usize) -> &Self { self.enqueue(Task::Delete(count)) }

    /// Queue a pause of `duration`.
    pub fn stop(&self, duration: Duration) -> &Self { self.enqueue(Task::Pause(duration)) }

    /// Queue any [`Task`].
    pub fn enqueue(&self, task: Task) -> &Self {
        lock_or_recover(&self.processor.state).queue.push(task);
        self
    }

    /// Begin draining the queue if a drain isn't already active.
    pub fn start(&self) { self.processor.try_start(); }

    /// Synchronously clear the queue and the text, and mark the typewriter as not
    /// running. Pending timers are left alone, use [`Self::detach()`] to cancel them.
    /// Any drain that was in flight stops at its next step without touching the text.
    pub fn reset(&self) {
        let mut state = lock_or_recover(&self.processor.state);
        state.queue.clear();
        state.is_running = false;
        state.is_writing = false;
        state.buffer.clear();
        state.generation += 1;
        if let Err(report) = self.processor.element.paint("") {
            tracing::warn!(message = "failed to clear element on reset", %report);
        }
        tracing::debug!(message = "reset", generation = state.generation);
    }

    /// Copy of the current text (without the cursor).
    #[must_use]
    pub fn text(&self) -> String {
        lock_or_recover(&self.processor.state).buffer.to_string()
    }

    #[must_use]
    pub fn is_running(&self) -> bool { lock_or_recover(&self.processor.state).is_running }

    #[must_use]
    pub fn is_writing(&self) -> bool { lock_or_recover(&self.processor.state).is_writing }

    #[must_use]
    pub fn queue_len(&self) -> usize { lock_or_recover(&self.processor.state).queue.len() }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        // We don't care about the returned element.
        drop(self.detach());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock, Weak,
                    atomic::{AtomicBool, Ordering}};

    use pretty_assertions::assert_eq;
    use tokio::time::{Duration, sleep};

    use super::Typewriter;
    use crate::{CallbackRecorder, ElementMock, RecordedCallback, TypewriterOptions};

    const SPEED: Duration = Duration::from_millis(100);
    const HALF: Duration = Duration::from_millis(50);

    fn options() -> TypewriterOptions {
        TypewriterOptions::default()
            .with_speed(SPEED)
            .with_cursor(false)
    }

    fn new_attached(options: TypewriterOptions) -> (Typewriter, ElementMock) {
        let element_mock = ElementMock::new();
        let typewriter = Typewriter::new(options);
        typewriter.attach(element_mock.clone());
        (typewriter, element_mock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_types_each_char_and_reports_prefixes() {
        let recorder = CallbackRecorder::new();
        let (typewriter, element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("Hello").start();
        assert!(typewriter.is_running());

        sleep(SPEED * 5 + HALF).await;

        assert_eq!(typewriter.text(), "Hello");
        assert_eq!(element_mock.get_current_text(), "Hello");
        assert_eq!(recorder.get_writes(), vec!["H", "He", "Hel", "Hell", "Hello"]);
        assert_eq!(recorder.get_complete_count(), 1);
        assert!(!typewriter.is_running());
        assert!(typewriter.timers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_happens_before_the_first_delay() {
        let recorder = CallbackRecorder::new();
        let (typewriter, element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("abc").start();
        sleep(HALF).await;

        assert_eq!(typewriter.text(), "");
        assert_eq!(element_mock.get_current_text(), "");
        assert!(recorder.get_writes().is_empty());
        assert!(typewriter.is_writing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_trims_from_the_end() {
        let recorder = CallbackRecorder::new();
        let (typewriter, element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("Hello").start();
        sleep(SPEED * 5 + HALF).await;

        typewriter.delete(3).start();
        sleep(SPEED * 3 + HALF).await;

        assert_eq!(typewriter.text(), "He");
        assert_eq!(element_mock.get_current_text(), "He");
        assert_eq!(recorder.get_deletes(), vec!["Hell", "Hel", "He"]);
        assert_eq!(recorder.get_complete_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_then_delete_chain() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("Hi").delete(1).start();
        sleep(SPEED * 3 + HALF).await;

        assert_eq!(typewriter.text(), "H");
        assert_eq!(recorder.get_writes(), vec!["H", "Hi"]);
        assert_eq!(recorder.get_deletes(), vec!["H"]);
        assert_eq!(recorder.get_complete_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_never_underflows() {
        let recorder = CallbackRecorder::new();
        let (typewriter, element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("ab").delete(4).start();
        sleep(SPEED * 6 + HALF).await;

        assert_eq!(typewriter.text(), "");
        assert_eq!(element_mock.get_current_text(), "");
        assert_eq!(recorder.get_deletes(), vec!["a", "", "", ""]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_graphemes_are_typed_as_one_step() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("e\u{301}🇯🇵").delete(1).start();
        sleep(SPEED * 3 + HALF).await;

        assert_eq!(recorder.get_writes(), vec!["e\u{301}", "e\u{301}🇯🇵"]);
        assert_eq!(recorder.get_deletes(), vec!["e\u{301}"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ansi_escapes_are_stripped_from_written_text() {
        let (typewriter, _element_mock) = new_attached(options());

        typewriter.write("\u{1b}[31mok\u{1b}[0m").start();
        sleep(SPEED * 2 + HALF).await;

        assert_eq!(typewriter.text(), "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_tasks_complete_without_callbacks() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("").delete(0).stop(Duration::ZERO).start();
        sleep(HALF).await;

        assert!(recorder.get_writes().is_empty());
        assert!(recorder.get_deletes().is_empty());
        assert_eq!(recorder.get_complete_count(), 1);
        assert!(!typewriter.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_on_empty_queue_does_nothing() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(recorder.wire(options()));

        typewriter.start();
        sleep(SPEED).await;

        assert!(!typewriter.is_running());
        assert_eq!(recorder.get_complete_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_delays_the_next_write() {
        let pause = Duration::from_millis(500);
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("a").stop(pause).write("b").start();

        // During the pause nothing changes.
        sleep(SPEED + HALF).await;
        assert_eq!(typewriter.text(), "a");
        sleep(pause - HALF).await;
        assert_eq!(typewriter.text(), "a");

        sleep(SPEED * 2).await;
        assert_eq!(typewriter.text(), "ab");

        let timed_writes = recorder.get_timed_writes();
        assert_eq!(timed_writes.len(), 2);
        let (first_at, _) = &timed_writes[0];
        let (second_at, second_text) = &timed_writes[1];
        assert_eq!(second_text, "ab");
        assert!(*second_at - *first_at >= pause + SPEED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_starts_run_each_task_once() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("abc");
        typewriter.start();
        typewriter.start();
        typewriter.start();

        sleep(SPEED + HALF).await;
        typewriter.start();

        sleep(SPEED * 5).await;

        assert_eq!(typewriter.text(), "abc");
        assert_eq!(recorder.get_writes(), vec!["a", "ab", "abc"]);
        assert_eq!(recorder.get_complete_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_mid_task_stops_all_mutation() {
        let recorder = CallbackRecorder::new();
        let (typewriter, element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("Hello").start();
        sleep(SPEED * 2 + HALF).await;
        assert_eq!(typewriter.text(), "He");

        typewriter.reset();
        assert_eq!(typewriter.text(), "");
        assert_eq!(element_mock.get_current_text(), "");
        assert_eq!(typewriter.queue_len(), 0);
        assert!(!typewriter.is_running());
        // The timer for the third char is still armed.
        assert_eq!(typewriter.timers().len(), 1);

        sleep(SPEED * 10).await;

        assert_eq!(typewriter.text(), "");
        assert_eq!(element_mock.get_current_text(), "");
        assert_eq!(recorder.get_writes(), vec!["H", "He"]);
        assert_eq!(recorder.get_complete_count(), 0);
        assert!(!typewriter.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_when_idle_and_after_completion() {
        let (typewriter, element_mock) = new_attached(options());

        typewriter.reset();
        assert_eq!(typewriter.text(), "");

        typewriter.write("Hey").start();
        sleep(SPEED * 3 + HALF).await;
        assert_eq!(element_mock.get_current_text(), "Hey");

        typewriter.reset();
        assert_eq!(typewriter.text(), "");
        assert_eq!(element_mock.get_current_text(), "");
        assert_eq!(typewriter.queue_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_work_after_reset_runs_normally() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("old").start();
        sleep(SPEED + HALF).await;
        typewriter.reset();

        typewriter.write("new").start();
        sleep(SPEED * 4).await;

        assert_eq!(typewriter.text(), "new");
        assert_eq!(recorder.get_writes(), vec!["o", "n", "ne", "new"]);
        assert_eq!(recorder.get_complete_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_replays_the_same_sequence() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) =
            new_attached(recorder.wire(options().with_loop(true)));

        typewriter.write("Hello").start();

        // Two full cycles: chars at 100..=500, then 600..=1000.
        sleep(SPEED * 10 + HALF).await;
        drop(typewriter.detach());

        let writes = recorder.get_writes();
        assert_eq!(writes.len(), 10);
        assert_eq!(writes[..5], writes[5..]);
        assert_eq!(writes[1], "He");
        assert_eq!(recorder.get_complete_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_clears_text_between_cycles() {
        let (typewriter, element_mock) = new_attached(options().with_loop(true));

        typewriter.write("ab").start();
        sleep(SPEED * 2 + HALF).await;
        assert_eq!(typewriter.text(), "");

        sleep(SPEED).await;
        assert_eq!(typewriter.text(), "a");

        let paints = element_mock.get_paints();
        // attach, "a", "ab", reseed, "a".
        assert_eq!(paints, vec!["", "a", "ab", "", "a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_snapshot_is_taken_when_drain_starts() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) =
            new_attached(recorder.wire(options().with_loop(true)));

        typewriter.write("ab").start();
        sleep(SPEED + HALF).await;

        // Appended mid run: typed in the first cycle only.
        typewriter.write("c");

        // First cycle: 100, 200, 300. Second cycle: 400, 500.
        sleep(SPEED * 4).await;

        assert_eq!(recorder.get_writes(), vec!["a", "ab", "abc", "a", "ab"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_of_instant_tasks_runs_once_then_idles() {
        let recorder = CallbackRecorder::new();
        let (typewriter, element_mock) =
            new_attached(recorder.wire(options().with_loop(true)));

        typewriter.write("").delete(0).start();
        sleep(SPEED * 5).await;

        assert_eq!(recorder.get_complete_count(), 1);
        assert!(recorder.get_writes().is_empty());
        assert!(!typewriter.is_running());
        assert_eq!(typewriter.queue_len(), 0);
        // Only the paint from attach, no reseed.
        assert_eq!(element_mock.get_paints(), vec![""]);

        // Timed work queued later loops as usual.
        typewriter.write("ok").start();
        sleep(SPEED * 2 + HALF).await;
        assert_eq!(recorder.get_writes(), vec!["o", "ok"]);
        assert_eq!(recorder.get_complete_count(), 2);
        assert!(typewriter.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_with_zero_speed_runs_once_then_idles() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(
            recorder.wire(options().with_speed(Duration::ZERO).with_loop(true)),
        );

        typewriter.write("ab").start();
        sleep(HALF).await;

        assert_eq!(typewriter.text(), "ab");
        assert_eq!(recorder.get_writes(), vec!["a", "ab"]);
        assert_eq!(recorder.get_complete_count(), 1);
        assert!(!typewriter.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_complete_can_enqueue_more_work() {
        let recorder = CallbackRecorder::new();
        let safe_typewriter: Arc<OnceLock<Weak<Typewriter>>> = Arc::new(OnceLock::new());
        let is_first_complete = Arc::new(AtomicBool::new(true));

        let options = {
            let recorder = recorder.clone();
            let safe_typewriter = safe_typewriter.clone();
            recorder.wire(options()).on_complete(move || {
                recorder.record(RecordedCallback::Complete);
                if !is_first_complete.swap(false, Ordering::SeqCst) {
                    return;
                }
                if let Some(typewriter) = safe_typewriter.get().and_then(Weak::upgrade) {
                    typewriter.write("x").start();
                }
            })
        };

        let typewriter = Arc::new(Typewriter::new(options));
        safe_typewriter.set(Arc::downgrade(&typewriter)).unwrap();
        let element_mock = ElementMock::new();
        typewriter.attach(element_mock.clone());

        typewriter.write("ab").start();
        sleep(SPEED * 3 + HALF).await;

        assert_eq!(typewriter.text(), "abx");
        assert_eq!(element_mock.get_current_text(), "abx");
        assert_eq!(recorder.get_writes(), vec!["a", "ab", "abx"]);
        assert_eq!(recorder.get_complete_count(), 2);
        assert!(!typewriter.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_target_skips_mutations() {
        let recorder = CallbackRecorder::new();
        let typewriter = Typewriter::new(recorder.wire(options()));

        typewriter.write("abc").delete(1).start();
        sleep(SPEED * 4 + HALF).await;

        assert_eq!(typewriter.text(), "");
        assert!(recorder.get_writes().is_empty());
        assert!(recorder.get_deletes().is_empty());
        assert_eq!(recorder.get_complete_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_cancels_timers_and_returns_element() {
        let recorder = CallbackRecorder::new();
        let (typewriter, _element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("Hello").start();
        sleep(SPEED + HALF).await;

        let maybe_element = typewriter.detach();
        assert!(maybe_element.is_some());
        assert!(typewriter.timers().is_empty());
        assert!(!typewriter.element().is_attached());

        sleep(SPEED * 10).await;
        assert_eq!(recorder.get_writes(), vec!["H"]);
        assert_eq!(typewriter.text(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_tears_down() {
        let recorder = CallbackRecorder::new();
        let (typewriter, element_mock) = new_attached(recorder.wire(options()));

        typewriter.write("Hello").start();
        sleep(SPEED + HALF).await;
        drop(typewriter);

        sleep(SPEED * 10).await;
        assert_eq!(recorder.get_writes(), vec!["H"]);
        assert_eq!(element_mock.get_current_text(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_failure_is_reported_and_clears_running() {
        let recorder = CallbackRecorder::new();
        let typewriter = Typewriter::new(recorder.wire(options()));
        // The paint on attach and the paint for "a" succeed.
        let element_mock = ElementMock::new_failing_after(2);
        typewriter.attach(element_mock.clone());

        typewriter.write("abc").write("d").start();
        sleep(SPEED * 5).await;

        assert_eq!(recorder.get_writes(), vec!["a"]);
        assert_eq!(recorder.get_errors().len(), 1);
        assert!(recorder.get_errors()[0].contains("failed to paint"));
        assert_eq!(recorder.get_complete_count(), 0);
        assert!(!typewriter.is_running());
        assert!(!typewriter.is_writing());
        // The remaining task stays queued so it can be resumed.
        assert_eq!(typewriter.queue_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_overlay_never_reaches_callbacks() {
        let recorder = CallbackRecorder::new();
        let cursor_speed = Duration::from_millis(450);
        let (typewriter, element_mock) = new_attached(
            recorder.wire(
                options()
                    .with_cursor(true)
                    .with_cursor_char("_")
                    .with_cursor_speed(cursor_speed),
            ),
        );

        typewriter.write("Hi").start();
        sleep(SPEED * 2 + cursor_speed * 3).await;

        assert_eq!(typewriter.text(), "Hi");
        assert_eq!(recorder.get_writes(), vec!["H", "Hi"]);
        assert!(element_mock.get_paints().iter().any(|paint| paint == "Hi_"));
        assert!(
            element_mock
                .get_paints()
                .iter()
                .all(|paint| !paint.starts_with("H_"))
        );

        drop(typewriter.detach());
        let paint_count = element_mock.get_paints().len();
        sleep(cursor_speed * 3).await;
        assert_eq!(element_mock.get_paints().len(), paint_count);
    }
}
