//! Channel negotiation and arbitration: INIT allocation, the busy /
//! silent-ignore split, and timeout recovery.

use authfob::hid::frame::{encode_cont, encode_init};
use authfob::hid::{
    BROADCAST_CID, Command, ErrorCode, IF_VERSION, INIT_PAYLOAD, RESERVED_CID,
};

use crate::mock_fob::{TestFob, assert_error, init_report, parse_init_reply, ping_report};

#[test]
fn broadcast_init_allocates_distinct_channels() {
    let mut fob = TestFob::new();

    let first = fob
        .send(init_report(BROADCAST_CID, &[0x11; 8]))
        .expect("INIT reply");
    let (nonce, cid_a, version, _caps) = parse_init_reply(&first);
    assert_eq!(first.cid, BROADCAST_CID);
    assert_eq!(nonce, [0x11; 8]);
    assert_eq!(version, IF_VERSION);
    assert_ne!(cid_a, RESERVED_CID);
    assert_ne!(cid_a, BROADCAST_CID);

    let second = fob
        .send(init_report(BROADCAST_CID, &[0x22; 8]))
        .expect("INIT reply");
    let (_, cid_b, _, _) = parse_init_reply(&second);
    assert_ne!(cid_a, cid_b, "each negotiation gets a fresh channel");
}

#[test]
fn init_on_specific_channel_echoes_it() {
    let mut fob = TestFob::new();

    let reply = fob
        .send(init_report(0xDEAD_BEEF, &[0x33; 8]))
        .expect("INIT reply");
    assert_eq!(reply.cid, 0xDEAD_BEEF);
    let (nonce, cid, _, _) = parse_init_reply(&reply);
    assert_eq!(nonce, [0x33; 8]);
    assert_eq!(cid, 0xDEAD_BEEF, "re-sync keeps the channel id");
}

#[test]
fn init_aborts_own_pending_transfer() {
    let mut fob = TestFob::new();
    let cid = fob.init();

    let pending = encode_init(cid, Command::Ping.into(), 99, &[0; INIT_PAYLOAD]);
    assert!(fob.send(pending).is_none());

    // INIT on the same channel is answered right away; the transfer is
    // abandoned without an error.
    let reply = fob.send(init_report(cid, &[0x44; 8])).expect("INIT reply");
    let (nonce, echoed, _, _) = parse_init_reply(&reply);
    assert_eq!(nonce, [0x44; 8]);
    assert_eq!(echoed, cid);

    // Nothing left to continue or to time out.
    assert!(fob.send(encode_cont(cid, 0, &[0; 59])).is_none());
    assert!(fob.advance(1000).is_none());
}

#[test]
fn init_on_other_channel_leaves_transfer_running() {
    let mut fob = TestFob::new();
    let cid_a = fob.init();
    let cid_b = cid_a ^ 1;

    let pending = encode_init(cid_a, Command::Ping.into(), 99, &[0; INIT_PAYLOAD]);
    assert!(fob.send(pending).is_none());

    // B's INIT is served immediately...
    let reply = fob.send(init_report(cid_b, &[0x55; 8])).expect("INIT reply");
    assert_eq!(reply.cid, cid_b);

    // ...while A's transfer still runs to its own timeout.
    let timeout = fob.advance(500).expect("timeout for A");
    assert_eq!(timeout.cid, cid_a);
    assert_error(&timeout, ErrorCode::MsgTimeout);
}

#[test]
fn busy_reply_for_second_channel_while_receiving() {
    let mut fob = TestFob::new();
    let cid_a = fob.init();
    let cid_b = cid_a ^ 1;

    let pending = encode_init(cid_a, Command::Ping.into(), 99, &[0; INIT_PAYLOAD]);
    assert!(fob.send(pending).is_none());

    // B's initial report bounces immediately; A's transfer is untouched.
    let busy = fob.send(ping_report(cid_b, &[1])).expect("busy");
    assert_eq!(busy.cid, cid_b);
    assert_error(&busy, ErrorCode::ChannelBusy);

    // A continuation spoofed on B's channel gets pure silence.
    assert!(fob.send(encode_cont(cid_b, 0, &[0; 59])).is_none());

    // A still owns the slot and eventually times out.
    let timeout = fob.advance(500).expect("timeout for A");
    assert_eq!(timeout.cid, cid_a);
    assert_error(&timeout, ErrorCode::MsgTimeout);
}

#[test]
fn reassembly_timeout_window_is_half_a_second() {
    let mut fob = TestFob::new();
    let cid = fob.init();

    let pending = encode_init(cid, Command::Ping.into(), 99, &[0; INIT_PAYLOAD]);
    assert!(fob.send(pending).is_none());

    assert!(fob.advance(499).is_none(), "not before the window closes");
    let timeout = fob.advance(1).expect("timeout at 500 ms");
    assert_error(&timeout, ErrorCode::MsgTimeout);
}

#[test]
fn continuations_refresh_the_deadline() {
    let mut fob = TestFob::new();
    let cid = fob.init();

    let total = INIT_PAYLOAD + 3 * 59;
    let pending = encode_init(cid, Command::Ping.into(), total, &[0; INIT_PAYLOAD]);
    assert!(fob.send(pending).is_none());

    fob.now_ms += 400;
    assert!(fob.send(encode_cont(cid, 0, &[0; 59])).is_none());

    // 600 ms after the initial report, but only 200 ms after the last
    // continuation: still alive.
    assert!(fob.advance(200).is_none());
    let timeout = fob.advance(300).expect("timeout 500 ms after last report");
    assert_eq!(timeout.cid, cid);
}

#[test]
fn idle_device_stays_silent() {
    let mut fob = TestFob::new();
    for _ in 0..10 {
        assert!(fob.advance(100).is_none());
    }
}
