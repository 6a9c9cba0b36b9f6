/*
 * Banner
 *
 * Runs the animated banner in a window. A field of small stars drifts across
 * the top of the window and swells around the mouse. In the top-left corner
 * a chameleon sits on a branch, turning its head after a fly; pointing at
 * its skin paints it with a color that cycles with time.
 *
 * Press D to show the debug overlay and the tuning panel.
 * Set RUST_LOG to change the log level and BANNER_CONFIG to load a config file.
 */

use banner::app;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    nannou::app(app::model).update(app::update).run();
}
