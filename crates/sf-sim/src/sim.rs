//! The stepping loop.

use tracing::{info, warn};

use crate::config::{DriverConfig, RunConfig};
use crate::error::{SimError, SimResult};
use crate::integrator::Integrator;
use crate::message::{auxiliary_times, format_message, throughput_mzps};
use crate::output::OutputSink;
use crate::physics::Physics;
use crate::schedule::{Channel, OutputContext, ScheduledOutput};
use crate::state::{DriverState, SessionState};

/// Channels seeded once at t=0 on a fresh run, in this order.
const INITIAL_OUTPUTS: [Channel; 3] = [Channel::Checkpoint, Channel::Product, Channel::Timeseries];

/// Run from the initial state of `config.physics` with a fresh driver state.
pub fn run_fresh<P: Physics>(
    config: &RunConfig<P>,
    sink: &mut dyn OutputSink<P>,
) -> SimResult<(P::State, DriverState)> {
    let mut driver = DriverState::new();
    let state = run(config, &mut driver, None, sink)?;
    Ok((state, driver))
}

/// Step `state` until `t_final` or the iteration cap, firing the output channels.
///
/// `initial` is the restored physics state of a restart; `None` starts from
/// [`Physics::initial_state`]. If `driver` has not started (iteration 0) every
/// channel is scheduled one interval out and the checkpoint, product and
/// timeseries channels fire once before the first step.
///
/// Configuration, and a restored state, are validated before anything is
/// emitted.
pub fn run<P: Physics>(
    config: &RunConfig<P>,
    driver: &mut DriverState,
    initial: Option<P::State>,
    sink: &mut dyn OutputSink<P>,
) -> SimResult<P::State> {
    let settings = &config.driver;
    settings.validate()?;
    let integrator = settings.integrator()?;
    let physics = &config.physics;
    physics.validate()?;
    let mut state = match initial {
        Some(restored) => {
            physics.validate_state(&restored)?;
            restored
        }
        None => physics.initial_state(),
    };
    check_time_kinds(settings, physics, &state)?;

    let fresh = driver.is_fresh();
    if fresh {
        driver.arm(settings);
    }
    info!(
        iteration = driver.iteration,
        time = physics.time_coordinate(&state, 0)?,
        t_final = settings.t_final,
        rk_order = integrator.order(),
        fresh,
        "run starting"
    );

    let mut session = SessionState::start(driver.iteration);
    let mut outputs = standard_outputs(settings);
    let mut ctx = OutputContext {
        physics,
        driver,
        session: &mut session,
        sink,
    };

    if fresh {
        for channel in INITIAL_OUTPUTS {
            if let Some(output) = outputs.iter_mut().find(|o| o.channel() == channel) {
                output.fire_unconditionally(&mut ctx, &state)?;
            }
        }
        // The initial checkpoint flushed before the t=0 sample existed.
        ctx.sink.timeseries(&ctx.driver.timeseries)?;
    }

    let cap = settings.iteration_cap();
    loop {
        let t0 = physics.time_coordinate(&state, 0)?;
        if t0 >= settings.t_final {
            break;
        }
        if let Some(cap) = cap
            && ctx.driver.iteration >= cap
        {
            info!(cap, "iteration cap reached");
            break;
        }

        let dt = settings.cfl * physics.stability_estimate(&state);
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, iteration = ctx.driver.iteration, "unusable time step");
            return Err(SimError::NonPhysical {
                what: format!("time step {dt} at t={t0}"),
            });
        }
        // Exact channels interpolate from the pre-step state. The window is
        // closed with the stepped state's own time so consecutive windows tile.
        let next = integrator.step(physics, &state, dt);
        let t1 = physics.time_coordinate(&next, 0)?;
        for output in outputs.iter_mut() {
            output.fire_exact(&mut ctx, &integrator, t0, t1, &state)?;
        }
        state = next;
        ctx.driver.iteration += 1;
        for output in outputs.iter_mut() {
            output.fire_nearest(&mut ctx, &state)?;
        }
    }

    ctx.sink.timeseries(&ctx.driver.timeseries)?;
    info!(
        iteration = ctx.driver.iteration,
        time = physics.time_coordinate(&state, 0)?,
        "run finished"
    );
    Ok(state)
}

/// The four channels in evaluation order.
pub fn standard_outputs<'a, P: Physics + 'a>(config: &DriverConfig) -> Vec<ScheduledOutput<'a, P>> {
    Channel::EVALUATION_ORDER
        .into_iter()
        .map(|channel| {
            let spec = config.schedule(channel);
            match channel {
                Channel::Message => {
                    ScheduledOutput::new(channel, spec, Box::new(emit_message::<P>))
                }
                Channel::Checkpoint => {
                    ScheduledOutput::new(channel, spec, Box::new(emit_checkpoint::<P>))
                }
                Channel::Product => {
                    ScheduledOutput::new(channel, spec, Box::new(emit_product::<P>))
                }
                Channel::Timeseries => {
                    ScheduledOutput::new(channel, spec, Box::new(record_sample::<P>))
                }
            }
        })
        .collect()
}

/// Every configured time kind must be readable from the starting state.
fn check_time_kinds<P: Physics>(
    config: &DriverConfig,
    physics: &P,
    state: &P::State,
) -> SimResult<()> {
    for channel in Channel::ALL {
        let kind = config.schedule(channel).time_kind;
        match physics.time_coordinate(state, kind) {
            Ok(_) => {}
            Err(SimError::TimeKindOutOfRange { kind }) => {
                return Err(SimError::Config {
                    param: format!("{channel}.time_kind"),
                    reason: format!("time kind {kind} is not supported by the physics module"),
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn emit_message<P: Physics>(ctx: &mut OutputContext<'_, P>, state: &P::State) -> SimResult<()> {
    let time = ctx.physics.time_coordinate(state, 0)?;
    let auxiliary = auxiliary_times(ctx.physics, state)?;
    let iterations = ctx
        .driver
        .iteration
        .saturating_sub(ctx.session.last_message_iteration);
    let mzps = throughput_mzps(
        iterations,
        ctx.physics.zone_count(state),
        ctx.session.stopwatch.lap(),
    );
    ctx.session.last_message_iteration = ctx.driver.iteration;
    ctx.sink
        .message(&format_message(ctx.driver.iteration, time, &auxiliary, mzps))
}

/// Write the checkpoint, then refresh the timeseries so both agree on disk.
fn emit_checkpoint<P: Physics>(ctx: &mut OutputContext<'_, P>, state: &P::State) -> SimResult<()> {
    let number = ctx.driver.clock(Channel::Checkpoint).count;
    ctx.sink.checkpoint(number, state, ctx.driver)?;
    info!(number, iteration = ctx.driver.iteration, "checkpoint written");
    ctx.sink.timeseries(&ctx.driver.timeseries)
}

fn emit_product<P: Physics>(ctx: &mut OutputContext<'_, P>, state: &P::State) -> SimResult<()> {
    let number = ctx.driver.clock(Channel::Product).count;
    let product = ctx.physics.derived_quantities(state);
    ctx.sink.product(number, state, &product)
}

fn record_sample<P: Physics>(ctx: &mut OutputContext<'_, P>, state: &P::State) -> SimResult<()> {
    let sample = ctx.physics.sample(state);
    ctx.driver.timeseries.accumulate(&sample);
    Ok(())
}
