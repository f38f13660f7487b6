// Full-screen fader
// Draws a flat-color quad over the whole viewport that fades out over time

use crate::graphics::{Blending, Color, Graphics, GraphicsError};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FaderError {
    #[error("fade time must be a positive number of seconds, got {0}")]
    InvalidFadeTime(f32),
    #[error("fade delay must be a number, got {0}")]
    InvalidDelay(f32),
}

/// Easing applied to fade progress (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeCurve {
    /// Quartic ease-in-out: 8t^4 below the midpoint, mirrored above it
    #[default]
    Fade,
    /// 6t^5 - 15t^4 + 10t^3
    Smootherstep,
    Linear,
}

impl FadeCurve {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Fade => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    let u = t - 1.0;
                    1.0 - 8.0 * u * u * u * u
                }
            }
            FadeCurve::Smootherstep => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
            FadeCurve::Linear => t,
        }
    }
}

/// Fades the whole screen from an opaque color to transparent.
///
/// Set it and forget it: construct it with the scene, call
/// [`advance`](Self::advance) at the end of every frame and [`dispose`](Self::dispose)
/// when the scene goes away. After an optional hold of `delay` seconds at full
/// opacity, the overlay fades out over `fade_time` seconds. Once finished it
/// never touches the graphics context again.
///
/// Useful for revealing a scene that took a few frames to finish loading.
#[derive(Debug)]
pub struct FullScreenFader<Q> {
    quad: Option<Q>,
    delay: f32,
    fade_time: f32,
    elapsed: f32,
    color: Color,
    curve: FadeCurve,
}

impl<Q> FullScreenFader<Q> {
    /// Fade from opaque black
    pub fn new(delay: f32, fade_time: f32) -> Result<Self, FaderError> {
        Self::with_color(delay, fade_time, Color::BLACK)
    }

    /// Fade from `initial_color`. Its alpha is ignored; the fade always starts opaque.
    pub fn with_color(delay: f32, fade_time: f32, initial_color: Color) -> Result<Self, FaderError> {
        if !(fade_time.is_finite() && fade_time > 0.0) {
            return Err(FaderError::InvalidFadeTime(fade_time));
        }
        if delay.is_nan() {
            return Err(FaderError::InvalidDelay(delay));
        }
        Ok(Self {
            quad: None,
            delay,
            fade_time,
            elapsed: 0.0,
            color: initial_color.with_alpha(1.0),
            curve: FadeCurve::default(),
        })
    }

    pub fn with_curve(mut self, curve: FadeCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.fade_time
    }

    /// Opacity the overlay has right now
    pub fn alpha(&self) -> f32 {
        if self.delay > 0.0 {
            1.0
        } else {
            1.0 - self.curve.apply(self.elapsed / self.fade_time)
        }
    }

    /// Color of the most recently drawn frame
    pub fn color(&self) -> Color {
        self.color
    }

    /// Seconds of fading done so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Remaining hold time; zero or negative once fading has begun
    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn fade_time(&self) -> f32 {
        self.fade_time
    }

    pub fn curve(&self) -> FadeCurve {
        self.curve
    }

    /// Whether GPU resources are currently held
    pub fn has_resources(&self) -> bool {
        self.quad.is_some()
    }

    /// Draw the overlay for this frame and advance the fade clock by `delta` seconds.
    ///
    /// Does nothing at all once the fade has finished.
    pub fn advance<G>(&mut self, gfx: &mut G, delta: f32) -> Result<(), GraphicsError>
    where
        G: Graphics<FlatQuad = Q>,
    {
        if self.is_finished() {
            return Ok(());
        }

        if self.delay > 0.0 {
            self.delay -= delta;
        }

        gfx.set_blending(Blending::Alpha);

        self.color.a = self.alpha();

        let quad = match self.quad.take() {
            Some(quad) => quad,
            None => {
                debug!("Creating full-screen fader quad");
                gfx.create_flat_quad()?
            }
        };
        gfx.draw_flat_quad(&quad, self.color);
        self.quad = Some(quad);

        if self.delay <= 0.0 {
            self.elapsed += delta;
            if self.is_finished() {
                debug!("Full-screen fade finished after {:.2}s", self.elapsed);
            }
        }

        Ok(())
    }

    /// Release the quad, its shader and uniform. Safe to call at any time.
    pub fn dispose(&mut self) {
        if self.quad.take().is_some() {
            debug!("Released full-screen fader resources");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Canvas;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct CountedQuad(Rc<Cell<u32>>);

    impl Drop for CountedQuad {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: u32,
        created: u32,
        drawn: Vec<Color>,
        blending: Blending,
        released: Rc<Cell<u32>>,
    }

    impl Graphics for Recorder {
        type FlatQuad = CountedQuad;

        fn viewport(&self) -> (u32, u32) {
            (640, 480)
        }

        fn clear(&mut self, _color: Color) {
            self.calls += 1;
        }

        fn set_blending(&mut self, blending: Blending) {
            self.calls += 1;
            self.blending = blending;
        }

        fn create_flat_quad(&mut self) -> Result<CountedQuad, GraphicsError> {
            self.calls += 1;
            self.created += 1;
            Ok(CountedQuad(self.released.clone()))
        }

        fn draw_flat_quad(&mut self, _quad: &CountedQuad, color: Color) {
            self.calls += 1;
            self.drawn.push(color);
        }

        fn draw_canvas(&mut self, _canvas: &Canvas) {
            self.calls += 1;
        }
    }

    fn fader(delay: f32, fade_time: f32) -> FullScreenFader<CountedQuad> {
        FullScreenFader::new(delay, fade_time).unwrap()
    }

    #[test]
    fn curves_hit_endpoints() {
        for curve in [FadeCurve::Fade, FadeCurve::Smootherstep, FadeCurve::Linear] {
            assert_eq!(curve.apply(0.0), 0.0);
            assert_eq!(curve.apply(1.0), 1.0);
            assert!((curve.apply(0.5) - 0.5).abs() < 1e-6);
            assert_eq!(curve.apply(2.0), 1.0);
            assert_eq!(curve.apply(-1.0), 0.0);
        }
    }

    #[test]
    fn fade_curve_eases_in_and_out() {
        let curve = FadeCurve::Fade;
        assert!((curve.apply(0.25) - 0.03125).abs() < 1e-6);
        assert!((curve.apply(0.75) - 0.96875).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_fade_time() {
        assert_eq!(
            FullScreenFader::<CountedQuad>::new(0.0, 0.0).unwrap_err(),
            FaderError::InvalidFadeTime(0.0)
        );
        assert!(FullScreenFader::<CountedQuad>::new(0.0, -1.0).is_err());
        assert!(FullScreenFader::<CountedQuad>::new(0.0, f32::NAN).is_err());
        assert!(FullScreenFader::<CountedQuad>::new(0.0, f32::INFINITY).is_err());
        assert!(FullScreenFader::<CountedQuad>::new(f32::NAN, 1.0).is_err());
        assert!(FullScreenFader::<CountedQuad>::new(-3.0, 1.0).is_ok());
    }

    #[test]
    fn initial_color_is_forced_opaque() {
        let fader: FullScreenFader<CountedQuad> =
            FullScreenFader::with_color(0.0, 1.0, Color::rgba(1.0, 0.0, 0.0, 0.2)).unwrap();
        assert_eq!(fader.color(), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(fader.alpha(), 1.0);
    }

    #[test]
    fn delay_holds_full_opacity() {
        let mut gfx = Recorder::default();
        let mut fader = fader(1.0, 2.0);
        for _ in 0..9 {
            fader.advance(&mut gfx, 0.1).unwrap();
            assert_eq!(fader.color().a, 1.0);
            assert_eq!(fader.elapsed(), 0.0);
        }
        assert_eq!(gfx.drawn.len(), 9);
        assert!(gfx.drawn.iter().all(|c| c.a == 1.0));
        assert_eq!(gfx.blending, Blending::Alpha);
    }

    #[test]
    fn alpha_decreases_monotonically_to_zero() {
        let mut gfx = Recorder::default();
        let mut fader = fader(0.25, 1.0);
        let mut last = 1.0;
        let mut frames = 0;
        while !fader.is_finished() {
            fader.advance(&mut gfx, 1.0 / 60.0).unwrap();
            let alpha = fader.color().a;
            assert!(alpha <= last, "alpha rose from {last} to {alpha}");
            last = alpha;
            frames += 1;
            assert!(frames < 1000);
        }
        assert_eq!(gfx.drawn.first().map(|c| c.a), Some(1.0));
        assert_eq!(fader.alpha(), 0.0);
        assert!(fader.elapsed() >= fader.fade_time());
    }

    #[test]
    fn finished_fader_is_inert() {
        let mut gfx = Recorder::default();
        let mut fader = fader(0.0, 0.5);
        fader.advance(&mut gfx, 0.3).unwrap();
        fader.advance(&mut gfx, 0.3).unwrap();
        assert!(fader.is_finished());

        let calls = gfx.calls;
        let elapsed = fader.elapsed();
        let color = fader.color();
        for _ in 0..5 {
            fader.advance(&mut gfx, 1.0).unwrap();
        }
        assert_eq!(gfx.calls, calls);
        assert_eq!(fader.elapsed(), elapsed);
        assert_eq!(fader.color(), color);
    }

    #[test]
    fn zero_delta_redraws_same_alpha() {
        let mut gfx = Recorder::default();
        let mut fader = fader(0.0, 1.0);
        fader.advance(&mut gfx, 0.4).unwrap();
        fader.advance(&mut gfx, 0.0).unwrap();
        fader.advance(&mut gfx, 0.0).unwrap();
        assert_eq!(gfx.drawn.len(), 3);
        assert_eq!(gfx.drawn[1], gfx.drawn[2]);
        assert_eq!(fader.elapsed(), 0.4);
    }

    #[test]
    fn quad_is_created_once() {
        let mut gfx = Recorder::default();
        let mut fader = fader(0.0, 1.0);
        assert!(!fader.has_resources());
        for _ in 0..10 {
            fader.advance(&mut gfx, 0.01).unwrap();
        }
        assert_eq!(gfx.created, 1);
        assert!(fader.has_resources());
    }

    #[test]
    fn dispose_before_render_is_safe() {
        let mut fader = fader(0.0, 1.0);
        fader.dispose();
        fader.dispose();
        assert!(!fader.has_resources());
    }

    #[test]
    fn dispose_releases_quad() {
        let mut gfx = Recorder::default();
        let released = gfx.released.clone();
        let mut fader = fader(0.0, 1.0);
        fader.advance(&mut gfx, 0.1).unwrap();
        assert_eq!(released.get(), 0);
        fader.dispose();
        assert_eq!(released.get(), 1);
        fader.dispose();
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn negative_delay_starts_fading_immediately() {
        let mut gfx = Recorder::default();
        let mut fader = fader(-1.0, 1.0);
        fader.advance(&mut gfx, 0.5).unwrap();
        assert_eq!(fader.elapsed(), 0.5);
        assert!(fader.alpha() < 1.0);
    }
}
