use std::time::Duration;

use gesture_relay::{CommandName, CommandReceiver, CommandSink, UdpCommandSink};

fn receiver() -> CommandReceiver {
    let receiver = CommandReceiver::bind("127.0.0.1:0").expect("bind receiver");
    receiver
        .set_timeout(Some(Duration::from_secs(2)))
        .expect("set timeout");
    receiver
}

#[test]
fn every_command_arrives_as_its_bare_name() {
    let receiver = receiver();
    let addr = receiver.local_addr().unwrap();
    let mut sink = UdpCommandSink::new(&addr.to_string()).expect("open sink");
    assert_eq!(sink.target(), addr);
    assert_eq!(sink.name(), format!("udp://{}", addr));

    for cmd in CommandName::ALL {
        sink.send(cmd.as_str()).expect("send");
        let datagram = receiver.recv().expect("recv").expect("datagram before timeout");
        assert_eq!(datagram.payload, cmd.as_str().as_bytes());
        assert_eq!(datagram.command().unwrap(), cmd);
    }
}

#[test]
fn unknown_payloads_are_delivered_but_not_decoded() {
    let receiver = receiver();
    let addr = receiver.local_addr().unwrap();
    let mut sink = UdpCommandSink::new(&addr.to_string()).expect("open sink");

    sink.send("JUMP").expect("send");
    let datagram = receiver.recv().expect("recv").expect("datagram before timeout");
    assert_eq!(datagram.payload, b"JUMP");
    assert!(datagram.command().is_err());
}

#[test]
fn receiver_times_out_quietly() {
    let receiver = CommandReceiver::bind("127.0.0.1:0").expect("bind receiver");
    receiver
        .set_timeout(Some(Duration::from_millis(50)))
        .expect("set timeout");
    assert!(receiver.recv().expect("recv").is_none());
}

#[test]
fn sending_without_a_listener_does_not_fail() {
    let idle = CommandReceiver::bind("127.0.0.1:0").expect("reserve port");
    let addr = idle.local_addr().unwrap();
    drop(idle);

    let mut sink = UdpCommandSink::new(&addr.to_string()).expect("open sink");
    assert!(sink.send("STOP").is_ok());
}

#[test]
fn unresolvable_target_is_rejected() {
    assert!(UdpCommandSink::new("not an address").is_err());
}
