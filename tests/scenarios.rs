//! End-to-end scenarios: image bytes in, machine state and output out.

use synacor::asm::{encode_image, format_trace, Line};
use synacor::cpu::DecodeError;
use synacor::{
    disassemble, parse_image, Cpu, CpuState, Fault, ImageError, LineInput, Memory, Opcode,
    Registers,
};

type TestCpu = Cpu<LineInput<&'static [u8]>, Vec<u8>>;

const R0: u16 = 32768;

/// Encode `words` as image bytes, parse them back and boot a CPU.
fn boot_image(words: &[u16], input: &'static [u8]) -> TestCpu {
    let image = parse_image(&encode_image(words)).expect("valid image");
    let mut cpu = Cpu::new(LineInput::new(input), Vec::new());
    cpu.load_program(image.as_slice()).expect("image fits");
    cpu
}

#[test]
fn halt_image_halts_at_pc_1() {
    let mut cpu = boot_image(&[0], b"");

    cpu.run().unwrap();

    assert_eq!(cpu.state, CpuState::Halted);
    assert_eq!(cpu.pc(), 1);
    assert_eq!(cpu.regs, Registers::new());
    assert!(cpu.stack.is_empty());
}

#[test]
fn out_then_halt_emits_one_character() {
    let mut cpu = boot_image(&[19, 65, 0], b"");

    cpu.run().unwrap();

    assert!(cpu.is_halted());
    assert_eq!(cpu.output().as_slice(), b"A");
}

#[test]
fn unknown_first_opcode_faults() {
    let mut cpu = boot_image(&[9999], b"");
    let before = cpu.mem.clone();

    assert!(cpu.run().is_err());

    assert_eq!(
        cpu.state,
        CpuState::Faulted(Fault::Decode(DecodeError::UnknownOpcode { opcode: 9999, addr: 0 }))
    );
    assert_eq!(cpu.mem, before);
}

#[test]
fn echo_program_copies_input_to_output() {
    // 0: IN r0 ; 2: OUT r0 ; 4: JMP 0
    let mut cpu = boot_image(&[20, R0, 19, R0, 6, 0], b"hello\nworld\n");

    cpu.run().unwrap();

    assert!(cpu.is_halted());
    assert_eq!(cpu.output().as_slice(), b"hello\nworld\n");
}

#[test]
fn countdown_loop() {
    // 0: SET r0 3
    // 3: OUT '*'
    // 5: ADD r0 r0 32767    ; r0 - 1
    // 9: JT r0 3
    // 12: HALT
    let mut cpu = boot_image(&[1, R0, 3, 19, 42, 9, R0, R0, 32767, 7, R0, 3, 0], b"");

    cpu.run().unwrap();

    assert_eq!(cpu.output().as_slice(), b"***");
    assert_eq!(cpu.regs.get(0), 0);
}

#[test]
fn nested_calls_return_in_order() {
    // 0: CALL 4 ; 2: HALT ; 3: NOOP
    // 4: OUT 'a' ; 6: CALL 9 ; 8: RET
    // 9: OUT 'b' ; 11: RET
    let mut cpu = boot_image(&[17, 4, 0, 21, 19, 97, 17, 9, 18, 19, 98, 18], b"");

    let mut max_depth = 0;
    while cpu.is_running() {
        cpu.step().unwrap();
        max_depth = max_depth.max(cpu.call_depth());
    }

    assert_eq!(cpu.output().as_slice(), b"ab");
    assert_eq!(max_depth, 2);
    assert_eq!(cpu.call_depth(), 0);
    assert_eq!(cpu.pc(), 3);
}

#[test]
fn disassembles_hi_string() {
    let mut mem = Memory::new();
    mem.load_program(&[19, 72, 19, 105, 19, 33, 9, R0, R0, 1, 0]).unwrap();

    let listing = disassemble(&mem, 0, 11);

    assert_eq!(listing.lines[0], Line::Text { addr: 0, text: "Hi!".into() });
    assert!(matches!(
        listing.lines[1],
        Line::Instruction { addr: 6, opcode: Opcode::Add, .. }
    ));
    assert!(matches!(
        listing.lines[2],
        Line::Instruction { addr: 10, opcode: Opcode::Halt, .. }
    ));
    assert_eq!(listing.len(), 3);
    assert_eq!(
        listing.to_string(),
        "0x0000: STRING \"Hi!\"\n0x0006: ADD r0 r0 0x0001\n0x000A: HALT\n"
    );
}

#[test]
fn rejects_malformed_images() {
    assert_eq!(parse_image(&[0, 0, 0]), Err(ImageError::OddLength { size: 3 }));
    assert!(matches!(
        parse_image(&vec![0; 65538]),
        Err(ImageError::TooLarge { size: 65538 })
    ));
}

#[test]
fn trace_indents_inside_calls() {
    let mut cpu = boot_image(&[17, 3, 0, 18], b"");
    let mut trace = Vec::new();

    while cpu.is_running() {
        let instr = cpu.peek().unwrap();
        trace.push(format_trace(cpu.call_depth(), &instr));
        cpu.step().unwrap();
    }

    assert_eq!(trace, vec!["0x0000: CALL 0x0003", "  0x0003: RET", "0x0002: HALT"]);
}
