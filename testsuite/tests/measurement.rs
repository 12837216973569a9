#![no_std]
#![no_main]

use sonar_bridge as _; // memory layout + panic handler

#[defmt_test::tests]
mod tests {
    use defmt::{assert, assert_eq};
    use sonar_bridge::{
        channel::{MeasurementChannel, Reading},
        measurement::{EdgePhase, Measurement, Outcome, State, Step},
        publisher::DistancePublisher,
    };

    #[test]
    fn distance_is_falling_minus_rising() {
        for &(rising, falling) in &[(0, 0), (100, 1500), (1, 65535), (40_000, 40_000), (12_345, 23_456)] {
            let mut m = Measurement::new();
            assert!(m.arm());
            assert_eq!(m.on_capture(rising), Step::RisingEdge(rising));
            assert_eq!(
                m.on_capture(falling),
                Step::Completed(Outcome::Echo(falling - rising))
            );
            assert_eq!(m.distance(), Some(falling - rising));
        }
    }

    #[test]
    fn counter_wrap_does_not_panic() {
        let mut m = Measurement::new();
        m.arm();
        m.on_capture(65_000);
        assert_eq!(m.on_capture(100), Step::Completed(Outcome::Echo(636)));
    }

    #[test]
    fn timeout_before_any_edge() {
        let mut m = Measurement::new();
        m.arm();
        assert_eq!(m.on_timeout(), Step::Completed(Outcome::Timeout));
        assert_eq!(m.state(), State::TimedOut);
        assert_eq!(m.edge_phase(), EdgePhase::Idle);
        assert_eq!(m.distance(), Some(0));
        assert!(m.is_complete());
    }

    #[test]
    fn timeout_after_rising_edge() {
        let mut m = Measurement::new();
        m.arm();
        m.on_capture(100);
        assert_eq!(m.edge_phase(), EdgePhase::RisingSeen);
        assert_eq!(m.on_timeout(), Step::Completed(Outcome::Timeout));
        assert_eq!(m.edge_phase(), EdgePhase::Idle);
        assert_eq!(m.distance(), Some(0));
    }

    #[test]
    fn phases_advance_one_edge_at_a_time() {
        let mut m = Measurement::new();
        assert_eq!(m.edge_phase(), EdgePhase::Idle);
        assert_eq!(m.on_capture(5), Step::Ignored);
        assert_eq!(m.edge_phase(), EdgePhase::Idle);

        m.arm();
        assert_eq!(m.edge_phase(), EdgePhase::Idle);
        m.on_capture(100);
        assert_eq!(m.edge_phase(), EdgePhase::RisingSeen);
        m.on_capture(1500);
        assert_eq!(m.edge_phase(), EdgePhase::FallingSeen);

        // noise after the falling edge
        assert_eq!(m.on_capture(1600), Step::Ignored);
        assert_eq!(m.on_capture(1700), Step::Ignored);
        assert_eq!(m.state(), State::Resolved(1400));
    }

    #[test]
    fn late_timeout_keeps_resolved_distance() {
        let mut m = Measurement::new();
        m.arm();
        m.on_capture(100);
        m.on_capture(1500);
        assert_eq!(m.on_timeout(), Step::Ignored);
        assert_eq!(m.distance(), Some(1400));
    }

    #[test]
    fn events_in_idle_are_ignored() {
        let mut m = Measurement::new();
        assert_eq!(m.on_timeout(), Step::Ignored);
        assert_eq!(m.on_capture(42), Step::Ignored);
        assert_eq!(m.state(), State::Idle);
        assert!(!m.is_complete());
        assert_eq!(m.distance(), None);
    }

    #[test]
    fn arm_refused_mid_cycle() {
        let mut m = Measurement::new();
        assert!(m.arm());
        assert!(!m.arm());
        m.on_capture(10);
        assert!(!m.arm());
        assert_eq!(m.state(), State::AwaitingFallingEdge { rising: 10 });
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut m = Measurement::new();
        m.arm();
        m.on_timeout();
        m.reset();
        assert_eq!(m.state(), State::Idle);
        assert!(!m.is_complete());
        assert!(m.arm());
    }

    #[test]
    fn channel_numbers_readings() {
        let mut channel = MeasurementChannel::new();
        let (mut producer, consumer) = channel.split();
        assert_eq!(consumer.latest(), Reading::NONE);

        producer.publish(1400);
        assert_eq!(consumer.latest(), Reading { distance: 1400, seq: 1 });
        producer.publish(0);
        assert_eq!(consumer.latest(), Reading { distance: 0, seq: 2 });
    }

    #[test]
    fn publisher_serves_zero_before_first_cycle() {
        let mut channel = MeasurementChannel::new();
        let (_producer, consumer) = channel.split();
        let mut publisher = DistancePublisher::new(consumer);
        assert_eq!(publisher.on_byte_requested(), 0);
        assert_eq!(publisher.on_byte_requested(), 0);
    }

    #[test]
    fn publisher_high_byte_first() {
        let mut channel = MeasurementChannel::new();
        let (mut producer, consumer) = channel.split();
        let mut publisher = DistancePublisher::new(consumer);

        producer.publish(1400);
        assert_eq!(publisher.on_byte_requested(), (1400u16 >> 8) as u8);
        assert_eq!(publisher.on_byte_requested(), (1400u16 & 0xFF) as u8);
    }

    #[test]
    fn publisher_reserves_last_pair() {
        let mut channel = MeasurementChannel::new();
        let (mut producer, consumer) = channel.split();
        let mut publisher = DistancePublisher::new(consumer);

        producer.publish(0xBEEF);
        for _ in 0..3 {
            assert_eq!(publisher.on_byte_requested(), 0xBE);
            assert_eq!(publisher.on_byte_requested(), 0xEF);
        }
        assert_eq!(publisher.latched().seq, 1);
    }

    #[test]
    fn fresh_reading_waits_for_pair_boundary() {
        let mut channel = MeasurementChannel::new();
        let (mut producer, consumer) = channel.split();
        let mut publisher = DistancePublisher::new(consumer);

        producer.publish(0x1234);
        assert_eq!(publisher.on_byte_requested(), 0x12);
        producer.publish(0xABCD);
        assert_eq!(publisher.on_byte_requested(), 0x34);
        assert_eq!(publisher.on_byte_requested(), 0xAB);
        assert_eq!(publisher.on_byte_requested(), 0xCD);
    }

    #[test]
    fn refresh_swaps_only_a_waiting_high_byte() {
        let mut channel = MeasurementChannel::new();
        let (mut producer, consumer) = channel.split();
        let mut publisher = DistancePublisher::new(consumer);

        // nothing handed out yet
        producer.publish(0x1234);
        assert!(!publisher.is_stale());
        assert_eq!(publisher.refresh(), None);

        // high byte of 0x1234 waiting, then 0xABCD lands
        assert_eq!(publisher.on_byte_requested(), 0x12);
        assert!(!publisher.is_stale());
        producer.publish(0xABCD);
        assert!(publisher.is_stale());
        assert_eq!(publisher.refresh(), Some(0xAB));
        assert!(!publisher.is_stale());
        assert_eq!(publisher.on_byte_requested(), 0xCD);

        // low byte waiting: no swap
        assert_eq!(publisher.on_byte_requested(), 0xAB);
        assert_eq!(publisher.on_byte_requested(), 0xCD);
        producer.publish(0x5678);
        assert_eq!(publisher.on_byte_requested(), 0x56);
        producer.publish(0x9999);
        assert_eq!(publisher.on_byte_requested(), 0x78);
        assert!(!publisher.is_stale());
        assert_eq!(publisher.refresh(), None);
    }

    #[test]
    fn same_value_twice_is_still_fresh() {
        let mut channel = MeasurementChannel::new();
        let (mut producer, consumer) = channel.split();
        let mut publisher = DistancePublisher::new(consumer);

        producer.publish(0x0102);
        assert_eq!(publisher.on_byte_requested(), 0x01);
        assert_eq!(publisher.on_byte_requested(), 0x02);
        producer.publish(0x0102);
        assert_eq!(publisher.on_byte_requested(), 0x01);
        assert_eq!(publisher.latched().seq, 2);
    }

    #[test]
    fn poller_at_cycle_rate_sees_every_reading() {
        let mut channel = MeasurementChannel::new();
        let (mut producer, consumer) = channel.split();
        let mut publisher = DistancePublisher::new(consumer);

        let distances = [1400u16, 0, 39_999, 256, 255, 0];
        for &d in &distances {
            producer.publish(d);
            let high = publisher.on_byte_requested();
            let low = publisher.on_byte_requested();
            assert_eq!(u16::from_be_bytes([high, low]), d);
        }
        assert_eq!(publisher.latched().seq, distances.len() as u32);
    }
}
