use std::sync::Arc;

use aircon_core::{
    compute, plan, AcType, CaseMemory, CaseStore, CompressorType, InputRecord, Mode, Movement,
    PlanInput,
};
use aircon_state::fakes::MemoryCaseStore;

fn hot_humid() -> InputRecord {
    InputRecord {
        room_temp: 40.0,
        humidity: 70.0,
        num_people: 2,
        movement: Movement::Yes,
        timing: "16:00".parse().unwrap(),
        position: "1o".parse().unwrap(),
        ac_type: AcType::Window,
        compressor_options: CompressorType::Reciprocating,
        tonnage: 2.0,
        iseer: 3.2,
        external_heat: 300.0,
        room_size: 220.0,
        affordable_units: 60.0,
    }
}

#[test]
fn plan_from_full_input_uses_only_conditions() {
    let input = hot_humid();
    let p = plan(&PlanInput::from(&input));
    assert_eq!(p.planned_ac_temp, 22.0);
    assert_eq!(p.mode, Mode::Dry);

    let p = plan(&PlanInput {
        room_temp: 25.0,
        humidity: 40.0,
    });
    assert_eq!(p.planned_ac_temp, 24.0);
    assert_eq!(p.mode, Mode::Cool);
}

#[test]
fn plan_can_disagree_with_cascade() {
    let input = hot_humid();
    let p = plan(&PlanInput::from(&input));
    let out = compute(&input).unwrap();
    assert_eq!(out.suggested_ac_temp, 18.0);
    assert_ne!(p.planned_ac_temp, out.suggested_ac_temp);
}

#[tokio::test]
async fn planning_never_touches_the_log() {
    let store = Arc::new(MemoryCaseStore::new());
    let _memory = CaseMemory::with_default_config(store.clone());
    for _ in 0..3 {
        plan(&PlanInput::from(&hot_humid()));
    }
    assert!(store.is_empty().await.unwrap());
}
