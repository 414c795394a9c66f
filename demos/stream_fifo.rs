//! Stream register slice testbench demo.
//!
//! Drives the built-in [`StreamFifo`] model with a free-running clock, a
//! reset pulse, and a short stream of data beats, printing every handshake
//! and pulse-output transition as it happens. Run with:
//!
//! ```sh
//! cargo run --example stream_fifo
//! ```

use deltabench::models::StreamFifo;
use deltabench::{Input, Scheduler, SimCtx, SimParams};

const CLOCK_HALF_PERIOD: u64 = 5;

fn tick(ctx: &mut SimCtx<StreamFifo>, clk: Input<bool>) {
    let level = ctx.val(clk);
    ctx.write(clk, !level);
    ctx.schedule_after(CLOCK_HALF_PERIOD, move |ctx| tick(ctx, clk));
}

fn main() {
    let params = SimParams {
        max_time: Some(200),
        ..Default::default()
    };
    deltabench::init_logging(&params.log_level);

    let mut sched = Scheduler::new(StreamFifo::new().with_event_every(3));
    sched.configure(&params);

    let clk = sched.bind_input::<bool>(StreamFifo::CLK);
    let rst = sched.bind_input::<bool>(StreamFifo::RST);
    let s_tvalid = sched.bind_input::<bool>(StreamFifo::S_TVALID);
    let s_tdata = sched.bind_input::<u8>(StreamFifo::S_TDATA);
    let m_tready = sched.bind_input::<bool>(StreamFifo::M_TREADY);
    let m_tvalid = sched.bind_output::<bool>(StreamFifo::M_TVALID);
    let m_tdata = sched.bind_output::<u8>(StreamFifo::M_TDATA);
    let event_out = sched.bind_output::<bool>(StreamFifo::EVENT_OUT);

    sched.watch("clk", clk);
    sched.watch("m_tvalid", m_tvalid);
    sched.watch("m_tdata", m_tdata);
    sched.watch("event_out", event_out);

    tick(sched.ctx_mut(), clk);

    // Reset pulse, then stimulus.
    sched.schedule_at(1, move |ctx| ctx.write(rst, true));
    sched.schedule_at(12, move |ctx| ctx.write(rst, false));
    sched.schedule_at(25, move |ctx| {
        println!("{:4}: testbench: setting s_tvalid=1, s_tdata=0x42", ctx.now());
        ctx.write(s_tvalid, true);
        ctx.write(s_tdata, 0x42);
    });
    sched.schedule_at(35, move |ctx| {
        println!("{:4}: testbench: setting m_tready=1", ctx.now());
        ctx.write(m_tready, true);
    });

    sched
        .process("clk_monitor", &[clk.id()], move |ctx| {
            if ctx.posedge(clk) {
                println!("{:4}: testbench: posedge clk", ctx.now());
            }
        })
        .unwrap();

    sched
        .process("valid_monitor", &[m_tvalid.id()], move |ctx| {
            println!(
                "{:4}: testbench: m_tvalid changed: {} -> {}",
                ctx.now(),
                ctx.prev(m_tvalid) as u8,
                ctx.val(m_tvalid) as u8
            );
        })
        .unwrap();

    sched
        .process("event_monitor", &[event_out.id()], move |ctx| {
            println!(
                "{:4}: testbench: event_out changed: {} -> {}",
                ctx.now(),
                ctx.prev(event_out) as u8,
                ctx.val(event_out) as u8
            );
        })
        .unwrap();

    // Feed a fresh beat whenever the previous one was taken.
    let mut beat: u8 = 0x42;
    sched
        .process("feeder", &[clk.id()], move |ctx| {
            if ctx.posedge(clk) && ctx.val(s_tvalid) && ctx.val(m_tready) {
                beat = beat.wrapping_add(1);
                ctx.write(s_tdata, beat);
            }
        })
        .unwrap();

    match sched.run() {
        Ok(summary) => {
            println!(
                "stopped: {:?} at t={} ({} instants, {} deltas)",
                summary.stop, summary.final_time, summary.stats.instants, summary.stats.deltas_run
            );
            println!(
                "trace: {}",
                serde_json::to_string_pretty(&sched.trace().export()).unwrap_or_default()
            );
        }
        Err(err) => eprintln!("simulation failed: {err}"),
    }
}
